#![cfg(feature = "cli")]

use std::process::{Command, Output};

use serde_json::Value;

fn dfpu(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dfpu"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .env_remove("DFPU_TIMEOUT")
        .output()
        .expect("dfpu should run")
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn calc_add_in_software() {
    let output = dfpu(&[
        "calc",
        "add",
        "--a",
        "123.45",
        "--b",
        "6.789",
        "--software",
    ]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    let result = &lines[0];
    assert_eq!(result["operation"], "add");
    assert_eq!(result["route"], "software");

    let lanes = result["lanes"].as_array().unwrap();
    assert_eq!(lanes.len(), 4);
    for lane in lanes {
        assert_eq!(lane["value"], "130.239");
        assert_eq!(lane["integer_places"], 3);
        assert_eq!(lane["decimal_places"], 3);
        assert_eq!(lane["significand"], 130_239);
        assert_eq!(lane["nan"], false);
    }
}

#[test]
fn calc_divide_through_emulator() {
    let output = dfpu(&[
        "calc",
        "divide",
        "--a",
        "123.45,1,2,1",
        "--b",
        "6.789,3,3,0",
        "--emulate",
    ]);
    assert!(output.status.success());

    let result = &json_lines(&output)[0];
    assert_eq!(result["route"], "accelerator");
    let lanes = result["lanes"].as_array().unwrap();
    assert_eq!(lanes[0]["significand"], 181_838_268);
    assert_eq!(lanes[0]["format"], "2.7");
    assert_eq!(lanes[1]["value"], "0.333333333");
    assert_eq!(lanes[2]["value"], "0.666666667");
    assert_eq!(lanes[3]["nan"], true);
}

#[test]
fn demo_runs_all_operations() {
    let output = dfpu(&["demo", "--software"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    let operations: Vec<&str> = lines
        .iter()
        .map(|line| line["operation"].as_str().unwrap())
        .collect();
    assert_eq!(operations, ["add", "subtract", "multiply", "divide"]);

    let significands: Vec<i64> = lines
        .iter()
        .map(|line| line["lanes"][0]["significand"].as_i64().unwrap())
        .collect();
    assert_eq!(significands, [130_239, 116_661, 83_810_205, 181_838_268]);
}

#[test]
fn unknown_operation_is_usage_error() {
    let output = dfpu(&["calc", "pow", "--a", "1", "--b", "2", "--software"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown operation"));
}

#[test]
fn wrong_lane_count_is_usage_error() {
    let output = dfpu(&["calc", "add", "--a", "1,2", "--b", "2", "--software"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn malformed_operand_is_data_error() {
    let output = dfpu(&["calc", "add", "--a", "1.2.3", "--b", "2", "--software"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(output.stdout.is_empty());
}

#[test]
fn timeout_env_is_validated() {
    let output = Command::new(env!("CARGO_BIN_EXE_dfpu"))
        .args(["--log-level", "error", "demo", "--software"])
        .env("DFPU_TIMEOUT", "0ms")
        .output()
        .expect("dfpu should run");
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn devices_lists_as_json() {
    let output = dfpu(&["devices"]);
    assert!(output.status.success());

    let result = &json_lines(&output)[0];
    let count = result["count"].as_u64().unwrap();
    assert_eq!(result["devices"].as_array().unwrap().len() as u64, count);
}

#[test]
fn version_prints_package_version() {
    let output = dfpu(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("dfpu {}", env!("CARGO_PKG_VERSION"))
    );
}
