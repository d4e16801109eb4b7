//! Accelerator operation codes.

use std::fmt;
use std::str::FromStr;

use dfpu_decimal::{add, divide, multiply, subtract, Decimal, Packed};

use crate::error::FrameError;

/// Arithmetic operation carried in the first byte of a request frame.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add = 0,
    Subtract = 1,
    Multiply = 2,
    Divide = 3,
}

impl Operation {
    /// All operations in wire-code order.
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// Wire code of this operation.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    /// Apply this operation to one lane pair.
    pub fn apply(self, a: Decimal, b: Decimal) -> Decimal {
        match self {
            Operation::Add => add(a, b),
            Operation::Subtract => subtract(a, b),
            Operation::Multiply => multiply(a, b),
            Operation::Divide => divide(a, b),
        }
    }

    /// Apply this operation lane by lane.
    pub fn apply_packed(self, a: &Packed, b: &Packed) -> Packed {
        std::array::from_fn(|lane| self.apply(a[lane], b[lane]))
    }
}

impl TryFrom<u8> for Operation {
    type Error = FrameError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Operation::ALL
            .into_iter()
            .find(|op| op.code() == code)
            .ok_or(FrameError::UnknownOperation(code))
    }
}

impl FromStr for Operation {
    type Err = FrameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "add" => Ok(Operation::Add),
            "sub" | "subtract" => Ok(Operation::Subtract),
            "mul" | "multiply" => Ok(Operation::Multiply),
            "div" | "divide" => Ok(Operation::Divide),
            _ => Err(FrameError::UnknownOperationName(name.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_are_stable() {
        assert_eq!(Operation::Add.code(), 0);
        assert_eq!(Operation::Subtract.code(), 1);
        assert_eq!(Operation::Multiply.code(), 2);
        assert_eq!(Operation::Divide.code(), 3);
        for op in Operation::ALL {
            assert_eq!(Operation::try_from(op.code()).unwrap(), op);
        }
        assert!(matches!(
            Operation::try_from(4),
            Err(FrameError::UnknownOperation(4))
        ));
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("ADD".parse::<Operation>().unwrap(), Operation::Add);
        assert_eq!("sub".parse::<Operation>().unwrap(), Operation::Subtract);
        assert_eq!(
            "multiply".parse::<Operation>().unwrap(),
            Operation::Multiply
        );
        assert_eq!("div".parse::<Operation>().unwrap(), Operation::Divide);
        assert!("modulo".parse::<Operation>().is_err());
    }

    #[test]
    fn apply_packed_is_lane_wise() {
        let a = [
            Decimal::new(1, 0, 1),
            Decimal::new(1, 0, 2),
            Decimal::new(1, 0, 3),
            Decimal::new(1, 0, 4),
        ];
        let b = [Decimal::new(1, 0, 2); 4];
        let product = Operation::Multiply.apply_packed(&a, &b);
        for lane in 0..4 {
            assert_eq!(product[lane], multiply(a[lane], b[lane]));
        }
    }
}
