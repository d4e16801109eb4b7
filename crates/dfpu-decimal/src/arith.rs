//! Elementwise decimal arithmetic.
//!
//! Every operation computes the exact result with 128-bit intermediates and
//! then normalizes it (see [`Decimal::from_scaled`]). NaN operands, division
//! by zero and integer overflow all produce [`NAN`].

use std::ops::{Add, Div, Mul, Sub};

use crate::value::{div_round, pow10, Decimal, NAN};

/// Fraction digits kept while dividing, before normalization rounds them off.
const DIVISION_GUARD_SCALE: u32 = 18;

/// `a + b`, at the larger of the two scales.
pub fn add(a: Decimal, b: Decimal) -> Decimal {
    if a.is_nan() || b.is_nan() {
        return NAN;
    }
    let (lhs, rhs, scale) = aligned(a, b);
    Decimal::from_scaled(lhs + rhs, scale)
}

/// `a - b`, at the larger of the two scales.
pub fn subtract(a: Decimal, b: Decimal) -> Decimal {
    if a.is_nan() || b.is_nan() {
        return NAN;
    }
    let (lhs, rhs, scale) = aligned(a, b);
    Decimal::from_scaled(lhs - rhs, scale)
}

/// `a × b`; the exact product carries the sum of both scales.
pub fn multiply(a: Decimal, b: Decimal) -> Decimal {
    if a.is_nan() || b.is_nan() {
        return NAN;
    }
    let (lhs, lhs_scale) = a.scaled();
    let (rhs, rhs_scale) = b.scaled();
    Decimal::from_scaled(lhs * rhs, lhs_scale + rhs_scale)
}

/// `a ÷ b`, keeping as many fraction digits as the format holds.
pub fn divide(a: Decimal, b: Decimal) -> Decimal {
    if a.is_nan() || b.is_nan() || b.significand == 0 {
        return NAN;
    }
    let (lhs, lhs_scale) = a.scaled();
    let (rhs, rhs_scale) = b.scaled();

    // lhs·10^-ls / (rhs·10^-rs) expressed at DIVISION_GUARD_SCALE.
    let exponent = rhs_scale + DIVISION_GUARD_SCALE - lhs_scale;
    let numerator = lhs * pow10(exponent);
    let quotient = if rhs < 0 {
        div_round(-numerator, -rhs)
    } else {
        div_round(numerator, rhs)
    };
    Decimal::from_scaled(quotient, DIVISION_GUARD_SCALE)
}

fn aligned(a: Decimal, b: Decimal) -> (i128, i128, u32) {
    let (lhs, lhs_scale) = a.scaled();
    let (rhs, rhs_scale) = b.scaled();
    let scale = lhs_scale.max(rhs_scale);
    (
        lhs * pow10(scale - lhs_scale),
        rhs * pow10(scale - rhs_scale),
        scale,
    )
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        add(self, rhs)
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        subtract(self, rhs)
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        multiply(self, rhs)
    }
}

impl Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        divide(self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Decimal = Decimal::new(3, 2, 12345);
    const B: Decimal = Decimal::new(1, 3, 6789);

    #[test]
    fn four_operations_on_reference_operands() {
        assert_eq!(add(A, B), Decimal::new(3, 3, 130_239));
        assert_eq!(subtract(A, B), Decimal::new(3, 3, 116_661));
        assert_eq!(multiply(A, B), Decimal::new(3, 5, 83_810_205));
        assert_eq!(divide(A, B), Decimal::new(2, 7, 181_838_268));
    }

    #[test]
    fn operators_match_functions() {
        assert_eq!(A + B, add(A, B));
        assert_eq!(A - B, subtract(A, B));
        assert_eq!(A * B, multiply(A, B));
        assert_eq!(A / B, divide(A, B));
    }

    #[test]
    fn subtraction_can_go_negative() {
        assert_eq!(subtract(B, A), Decimal::new(3, 3, -116_661));
        assert_eq!(subtract(A, A), Decimal::new(0, 2, 0));
    }

    #[test]
    fn result_integer_places_follow_the_value() {
        let half = Decimal::new(9, 2, 50);
        assert_eq!(add(half, half), Decimal::new(1, 2, 100));
        assert_eq!(subtract(half, half), Decimal::new(0, 2, 0));
    }

    #[test]
    fn division_rounds_half_away_from_zero() {
        let one = Decimal::new(1, 0, 1);
        let two = Decimal::new(1, 0, 2);
        let three = Decimal::new(1, 0, 3);
        assert_eq!(divide(one, three), Decimal::new(0, 9, 333_333_333));
        assert_eq!(divide(two, three), Decimal::new(0, 9, 666_666_667));
        assert_eq!(
            divide(Decimal::new(1, 0, -2), three),
            Decimal::new(0, 9, -666_666_667)
        );
        assert_eq!(
            divide(two, Decimal::new(1, 0, -3)),
            Decimal::new(0, 9, -666_666_667)
        );
    }

    #[test]
    fn multiplication_drops_fraction_digits_to_fit() {
        let a = Decimal::new(5, 4, 999_999_999);
        let b = Decimal::new(2, 1, 999);
        // 99999.9999 × 99.9 = 9989999.99001
        assert_eq!(multiply(a, b), Decimal::new(7, 2, 998_999_999));
    }

    #[test]
    fn overflow_and_invalid_inputs_are_nan() {
        let max = Decimal::new(9, 0, 999_999_999);
        let one = Decimal::new(1, 0, 1);
        assert!(add(max, one).is_nan());
        assert!(multiply(max, max).is_nan());
        assert!(divide(one, Decimal::new(1, 2, 0)).is_nan());
        assert!(add(NAN, one).is_nan());
        assert!(subtract(one, NAN).is_nan());
    }
}
