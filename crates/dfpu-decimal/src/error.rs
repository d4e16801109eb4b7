/// Errors that can occur when parsing a decimal from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecimalError {
    /// The input contained no digits.
    #[error("empty decimal literal")]
    Empty,

    /// The input contained a character that is not part of a decimal literal.
    #[error("invalid character {ch:?} in decimal literal")]
    InvalidCharacter { ch: char },

    /// The literal needs more significant digits than the format holds.
    #[error("too many digits ({digits}, max {max})")]
    TooManyDigits { digits: usize, max: u8 },
}

pub type Result<T> = std::result::Result<T, DecimalError>;
