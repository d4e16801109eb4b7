use std::ffi::c_void;

use dfpu_decimal::Decimal;
use dfpu_dispatch::Dispatcher;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfpuResult {
    Ok = 0,
    InvalidArgument = 1,
    Internal = 99,
}

#[allow(dead_code)]
pub const DFPU_OK: DfpuResult = DfpuResult::Ok;
#[allow(dead_code)]
pub const DFPU_ERR_INVALID_ARGUMENT: DfpuResult = DfpuResult::InvalidArgument;
#[allow(dead_code)]
pub const DFPU_ERR_INTERNAL: DfpuResult = DfpuResult::Internal;

/// Lanes in every packed argument and result.
pub const DFPU_LANES: usize = dfpu_decimal::LANES;

/// C view of one decimal value. Layout-compatible with the accelerator's own
/// struct: two place counts followed by the significand.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DfpuDecimal {
    pub integer_places: u8,
    pub decimal_places: u8,
    pub significand: i32,
}

impl From<DfpuDecimal> for Decimal {
    fn from(value: DfpuDecimal) -> Self {
        Decimal::new(
            value.integer_places,
            value.decimal_places,
            value.significand,
        )
    }
}

impl From<Decimal> for DfpuDecimal {
    fn from(value: Decimal) -> Self {
        Self {
            integer_places: value.integer_places,
            decimal_places: value.decimal_places,
            significand: value.significand,
        }
    }
}

pub type DfpuHandle = *mut c_void;

pub(crate) struct DispatcherHandle {
    pub(crate) dispatcher: Dispatcher,
}
