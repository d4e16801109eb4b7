//! dfpu-ffi: C-ABI exports for the dfpu dispatcher.

mod args;
mod dispatcher;
mod error;
mod types;

use std::panic::AssertUnwindSafe;

pub use dispatcher::{
    dfpu_add_packed, dfpu_divide_packed, dfpu_init, dfpu_is_connected, dfpu_multiply_packed,
    dfpu_reconnect, dfpu_subtract_packed, dfpu_term,
};
pub use types::{
    DfpuDecimal, DfpuHandle, DfpuResult, DFPU_ERR_INTERNAL, DFPU_ERR_INVALID_ARGUMENT, DFPU_LANES,
    DFPU_OK,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

/// Message describing the last failed call on this thread; empty if none.
#[no_mangle]
pub extern "C" fn dfpu_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}
