use dfpu_decimal::{Decimal, Packed, LANES};

use crate::error;
use crate::types::DfpuDecimal;

/// Read a packed operand from `DFPU_LANES` consecutive C decimals.
///
/// # Safety
/// `value` must be null or readable for `DFPU_LANES` elements.
pub(crate) unsafe fn packed_arg(value: *const DfpuDecimal, name: &str) -> Option<Packed> {
    if value.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null"));
        return None;
    }

    // SAFETY: Pointer is non-null and the caller guarantees LANES readable elements.
    let lanes = unsafe { std::slice::from_raw_parts(value, LANES) };
    Some(std::array::from_fn(|i| Decimal::from(lanes[i])))
}

/// Check an output pointer before any work is done.
pub(crate) fn out_arg(value: *mut DfpuDecimal, name: &str) -> Option<*mut DfpuDecimal> {
    if value.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null"));
        return None;
    }
    Some(value)
}

/// Write result lanes to a validated output pointer.
///
/// # Safety
/// `out` must be writable for `DFPU_LANES` elements.
pub(crate) unsafe fn write_packed(out: *mut DfpuDecimal, lanes: &Packed) {
    // SAFETY: The caller guarantees LANES writable elements.
    let dst = unsafe { std::slice::from_raw_parts_mut(out, LANES) };
    for (slot, value) in dst.iter_mut().zip(lanes) {
        *slot = DfpuDecimal::from(*value);
    }
}
