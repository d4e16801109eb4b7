use std::fmt;

use dfpu_decimal::DecimalError;
use dfpu_frame::FrameError;
use dfpu_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
}

pub fn decimal_error(context: &str, err: DecimalError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        FrameError::UnknownOperationName(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_follow_their_source() {
        let err = decimal_error("--a", DecimalError::Empty);
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("--a: "));

        let err = frame_error("operation", FrameError::UnknownOperationName("pow".into()));
        assert_eq!(err.code, USAGE);

        let err = frame_error(
            "exchange",
            FrameError::Transport(TransportError::NotConnected),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);

        let err = frame_error("decode", FrameError::UnknownOperation(9));
        assert_eq!(err.code, INTERNAL);
    }
}
