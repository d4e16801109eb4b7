use dfpu_transport::{Direction, TransportError};

/// Errors that can occur while exchanging or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The request frame carries an operation code the accelerator does not know.
    #[error("unknown operation code {0}")]
    UnknownOperation(u8),

    /// An operation name could not be parsed.
    #[error("unknown operation {0:?} (expected add, subtract, multiply or divide)")]
    UnknownOperationName(String),

    /// A transfer moved fewer bytes than a frame needs.
    #[error("{direction} transferred {len} bytes, frame needs {expected}")]
    Truncated {
        direction: Direction,
        len: usize,
        expected: usize,
    },

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
