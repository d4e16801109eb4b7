use std::fmt;
use std::time::Duration;

/// Transfer direction, used to label errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Send,
    Receive,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Send => f.write_str("send"),
            Direction::Receive => f.write_str("receive"),
        }
    }
}

/// Errors that can occur in HID transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No device matching the filter could be found and opened.
    #[error("no device found (vendor {vendor_id:#06x}, product {product_id:#06x})")]
    NoDeviceFound { vendor_id: u16, product_id: u16 },

    /// Enumerating the host's HID devices failed.
    #[error("device discovery failed: {0}")]
    Discovery(std::io::Error),

    /// A transfer did not complete before its deadline.
    #[error("{direction} timed out after {after:?}")]
    Timeout {
        direction: Direction,
        after: Duration,
    },

    /// A transfer failed with an I/O error.
    #[error("{direction} failed: {source}")]
    Io {
        direction: Direction,
        source: std::io::Error,
    },

    /// A transfer completed without carrying any payload after the report id.
    #[error("{direction} completed with an empty report")]
    EmptyReport { direction: Direction },

    /// The payload plus report id does not fit the scratch buffer.
    #[error("report too large ({len} bytes, max {max})")]
    Oversized { len: usize, max: usize },

    /// No device is connected.
    #[error("device not connected")]
    NotConnected,
}

impl TransportError {
    /// Numeric status in the transport's wire convention: `0` for a timeout,
    /// negative for every other failure.
    pub fn status_code(&self) -> i32 {
        match self {
            TransportError::Timeout { .. } => 0,
            _ => -1,
        }
    }

    /// True if this error means the device connection was lost.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout { .. }
                | TransportError::Io { .. }
                | TransportError::EmptyReport { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Collapse a transfer result into the numeric convention: positive byte
/// count on success, `0` on timeout, negative on any other error.
pub fn status_code(result: &Result<usize>) -> i32 {
    match result {
        Ok(n) => i32::try_from(*n).unwrap_or(i32::MAX),
        Err(err) => err.status_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_wire_convention() {
        assert_eq!(status_code(&Ok(64)), 64);
        assert_eq!(
            status_code(&Err(TransportError::Timeout {
                direction: Direction::Send,
                after: Duration::from_millis(100),
            })),
            0
        );
        assert_eq!(status_code(&Err(TransportError::NotConnected)), -1);
        assert_eq!(
            status_code(&Err(TransportError::EmptyReport {
                direction: Direction::Receive
            })),
            -1
        );
    }

    #[test]
    fn only_transfer_failures_disconnect() {
        assert!(TransportError::EmptyReport {
            direction: Direction::Receive
        }
        .is_disconnect());
        let oversized = TransportError::Oversized { len: 600, max: 516 };
        assert!(!oversized.is_disconnect());
        assert!(!TransportError::NotConnected.is_disconnect());
    }

    #[test]
    fn error_messages_name_direction() {
        let err = TransportError::Timeout {
            direction: Direction::Receive,
            after: Duration::from_millis(100),
        };
        assert_eq!(err.to_string(), "receive timed out after 100ms");
    }
}
