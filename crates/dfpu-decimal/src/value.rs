use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DecimalError, Result};

/// Maximum number of significant digits (integer + fraction) in a value.
pub const MAX_DIGITS: u8 = 9;

/// Number of lanes processed together by the accelerator.
pub const LANES: usize = 4;

/// Significand reserved for "not a number".
const NAN_SIGNIFICAND: i32 = i32::MIN;

/// The canonical not-a-number value.
pub const NAN: Decimal = Decimal {
    integer_places: 0,
    decimal_places: 0,
    significand: NAN_SIGNIFICAND,
};

/// Four decimals processed as one accelerator request.
pub type Packed = [Decimal; LANES];

/// A fixed-point decimal: `significand × 10^-decimal_places`.
///
/// `integer_places` records how many integer digits the format carries. It
/// does not take part in the numeric value, but it travels over the wire.
/// Arithmetic results carry their own count, recomputed from the value
/// rather than copied from an operand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decimal {
    pub integer_places: u8,
    pub decimal_places: u8,
    pub significand: i32,
}

impl Decimal {
    /// Create a decimal from its raw format fields.
    pub const fn new(integer_places: u8, decimal_places: u8, significand: i32) -> Self {
        Self {
            integer_places,
            decimal_places,
            significand,
        }
    }

    /// True for the NaN sentinel or for a format wider than [`MAX_DIGITS`].
    pub fn is_nan(&self) -> bool {
        self.significand == NAN_SIGNIFICAND
            || u16::from(self.integer_places) + u16::from(self.decimal_places)
                > u16::from(MAX_DIGITS)
    }

    /// Build a normalized decimal from `value × 10^-scale`.
    ///
    /// Fraction digits are rounded half away from zero until the value fits
    /// in [`MAX_DIGITS`]; an integer part that does not fit yields [`NAN`].
    pub(crate) fn from_scaled(mut value: i128, mut scale: u32) -> Self {
        loop {
            let integer_digits = digit_count(value.unsigned_abs() / pow10(scale).unsigned_abs());
            if integer_digits > u32::from(MAX_DIGITS) {
                return NAN;
            }

            let max_scale = u32::from(MAX_DIGITS) - integer_digits;
            if scale <= max_scale {
                // |value| < 10^MAX_DIGITS here, so the narrowing is lossless.
                return Self {
                    integer_places: integer_digits as u8,
                    decimal_places: scale as u8,
                    significand: value as i32,
                };
            }

            value = div_round(value, pow10(scale - max_scale));
            scale = max_scale;
        }
    }

    /// The significand widened to 128 bits together with its scale.
    pub(crate) fn scaled(&self) -> (i128, u32) {
        (i128::from(self.significand), u32::from(self.decimal_places))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            return f.write_str("NaN");
        }

        let sign = if self.significand < 0 { "-" } else { "" };
        let magnitude = self.significand.unsigned_abs();
        if self.decimal_places == 0 {
            return write!(f, "{sign}{magnitude}");
        }

        let unit = pow10(u32::from(self.decimal_places)).unsigned_abs() as u32;
        write!(
            f,
            "{sign}{}.{:0width$}",
            magnitude / unit,
            magnitude % unit,
            width = usize::from(self.decimal_places)
        )
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("nan") {
            return Ok(NAN);
        }

        let (negative, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(DecimalError::Empty);
        }
        if let Some(ch) = integer
            .chars()
            .chain(fraction.chars())
            .find(|c| !c.is_ascii_digit())
        {
            return Err(DecimalError::InvalidCharacter { ch });
        }

        let integer = integer.trim_start_matches('0');
        let digits = integer.len() + fraction.len();
        if digits > usize::from(MAX_DIGITS) {
            return Err(DecimalError::TooManyDigits {
                digits,
                max: MAX_DIGITS,
            });
        }

        let magnitude = integer
            .bytes()
            .chain(fraction.bytes())
            .fold(0i32, |acc, b| acc * 10 + i32::from(b - b'0'));

        Ok(Self {
            integer_places: integer.len() as u8,
            decimal_places: fraction.len() as u8,
            significand: if negative { -magnitude } else { magnitude },
        })
    }
}

pub(crate) fn pow10(exp: u32) -> i128 {
    10i128.pow(exp)
}

fn digit_count(mut value: u128) -> u32 {
    let mut digits = 0;
    while value > 0 {
        value /= 10;
        digits += 1;
    }
    digits
}

/// Integer division rounding half away from zero. `divisor` must be positive.
pub(crate) fn div_round(value: i128, divisor: i128) -> i128 {
    let quotient = value / divisor;
    let remainder = value % divisor;
    if remainder.abs() * 2 >= divisor {
        quotient + value.signum()
    } else {
        quotient
    }
}
