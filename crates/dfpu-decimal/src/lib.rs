//! Fixed-point decimal values as understood by the DFPU accelerator.
//!
//! A [`Decimal`] is a 32-bit signed significand scaled by a power of ten,
//! together with the integer/fraction digit split of its format. At most
//! [`MAX_DIGITS`] digits are significant. Four values travel together as a
//! [`Packed`] vector, one per accelerator lane.

pub mod arith;
pub mod error;
pub mod value;

pub use arith::{add, divide, multiply, subtract};
pub use error::{DecimalError, Result};
pub use value::{Decimal, Packed, LANES, MAX_DIGITS, NAN};
