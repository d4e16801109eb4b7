mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "dfpu", version, about = "Decimal arithmetic on the DFPU accelerator")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_calc_subcommand() {
        let cli = Cli::try_parse_from([
            "dfpu",
            "calc",
            "add",
            "--a",
            "123.45",
            "--b",
            "6.789",
            "--software",
        ])
        .expect("calc args should parse");

        let Command::Calc(args) = cli.command else {
            panic!("expected calc");
        };
        assert_eq!(args.operation, "add");
        assert_eq!(args.a, ["123.45"]);
        assert!(args.target.software);
    }

    #[test]
    fn splits_lane_lists_and_accepts_negatives() {
        let cli = Cli::try_parse_from([
            "dfpu",
            "calc",
            "sub",
            "--a",
            "1,-2,3,4",
            "--b",
            "-0.5",
            "--emulate",
        ])
        .expect("calc args should parse");

        let Command::Calc(args) = cli.command else {
            panic!("expected calc");
        };
        assert_eq!(args.a, ["1", "-2", "3", "4"]);
        assert_eq!(args.b, ["-0.5"]);
    }

    #[test]
    fn rejects_software_with_emulate() {
        let err = Cli::try_parse_from(["dfpu", "demo", "--software", "--emulate"])
            .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_demo_watch() {
        let cli = Cli::try_parse_from(["dfpu", "--format", "json", "demo", "--watch", "500ms"])
            .expect("demo args should parse");
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.watch.as_deref(), Some("500ms"));
    }
}
