use dfpu_decimal::{Decimal, Packed, LANES};
use dfpu_dispatch::Route;
use dfpu_frame::Operation;

use crate::cmd::CalcArgs;
use crate::exit::{decimal_error, frame_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};
use crate::output::{print_dispatch, OutputFormat};

pub fn run(args: CalcArgs, format: OutputFormat) -> CliResult<i32> {
    let operation: Operation = args
        .operation
        .parse()
        .map_err(|err| frame_error("invalid operation", err))?;
    let a = parse_operand("--a", &args.a)?;
    let b = parse_operand("--b", &args.b)?;

    let dispatcher = args.target.dispatcher()?;
    let dispatch = dispatcher.dispatch(operation, &a, &b);
    dispatcher.terminate();

    print_dispatch(operation, &a, &b, &dispatch, format);
    if dispatch.route == Route::Aborted {
        return Ok(FAILURE);
    }
    Ok(SUCCESS)
}

/// One value is broadcast to every lane; otherwise exactly one per lane.
fn parse_operand(name: &str, values: &[String]) -> CliResult<Packed> {
    let parsed = values
        .iter()
        .map(|value| {
            value
                .parse::<Decimal>()
                .map_err(|err| decimal_error(&format!("{name} value {value:?}"), err))
        })
        .collect::<CliResult<Vec<_>>>()?;

    match parsed.as_slice() {
        [single] => Ok([*single; LANES]),
        lanes => Packed::try_from(lanes).map_err(|_| {
            CliError::new(
                USAGE,
                format!("{name} takes 1 or {LANES} values, got {}", lanes.len()),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::DATA_INVALID;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn single_value_is_broadcast() {
        let packed = parse_operand("--a", &strings(&["123.45"])).unwrap();
        assert_eq!(packed, [Decimal::new(3, 2, 12345); LANES]);
    }

    #[test]
    fn four_values_fill_lanes_in_order() {
        let packed = parse_operand("--b", &strings(&["1", "-2.5", "0.003", "NaN"])).unwrap();
        assert_eq!(packed[0], Decimal::new(1, 0, 1));
        assert_eq!(packed[1], Decimal::new(1, 1, -25));
        assert_eq!(packed[2], Decimal::new(0, 3, 3));
        assert!(packed[3].is_nan());
    }

    #[test]
    fn wrong_lane_count_is_usage_error() {
        let err = parse_operand("--a", &strings(&["1", "2"])).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("got 2"));
    }

    #[test]
    fn malformed_value_is_data_error() {
        let err = parse_operand("--a", &strings(&["1", "x", "3", "4"])).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        let err = parse_operand("--a", &strings(&["1234567890"])).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }
}
