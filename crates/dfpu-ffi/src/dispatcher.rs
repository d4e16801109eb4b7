use dfpu_dispatch::Dispatcher;
use dfpu_frame::Operation;

use crate::args;
use crate::error;
use crate::types::{DfpuDecimal, DfpuHandle, DfpuResult, DispatcherHandle};

fn with_dispatcher<T>(
    handle: DfpuHandle,
    on_error: T,
    f: impl FnOnce(&Dispatcher) -> T,
) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_argument("dfpu handle cannot be null");
        return on_error;
    }

    let dispatcher_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &*(handle as *const DispatcherHandle) }
    };

    f(&dispatcher_handle.dispatcher)
}

/// # Safety
/// See [`dfpu_add_packed`].
unsafe fn packed_op(
    handle: DfpuHandle,
    operation: Operation,
    a: *const DfpuDecimal,
    b: *const DfpuDecimal,
    r: *mut DfpuDecimal,
) -> DfpuResult {
    crate::ffi_boundary(DfpuResult::Internal, || {
        error::clear_error_state();

        // SAFETY: Null is checked by the helpers; extent is guaranteed by the caller.
        let Some(a) = (unsafe { args::packed_arg(a, "a") }) else {
            return DfpuResult::InvalidArgument;
        };
        // SAFETY: As above.
        let Some(b) = (unsafe { args::packed_arg(b, "b") }) else {
            return DfpuResult::InvalidArgument;
        };
        let Some(r) = args::out_arg(r, "r") else {
            return DfpuResult::InvalidArgument;
        };

        with_dispatcher(handle, DfpuResult::InvalidArgument, |dispatcher| {
            let result = dispatcher.dispatch(operation, &a, &b);
            // SAFETY: `r` is non-null and the caller guarantees its extent.
            unsafe { args::write_packed(r, &result.lanes) };
            DfpuResult::Ok
        })
    })
}

/// Create a dispatcher, connecting to the accelerator if one is attached.
///
/// Never returns null unless the library panicked; without a device all
/// operations run in software. Release with `dfpu_term`.
#[no_mangle]
pub extern "C" fn dfpu_init() -> DfpuHandle {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();
        let handle = DispatcherHandle {
            dispatcher: Dispatcher::init(),
        };
        Box::into_raw(Box::new(handle)) as DfpuHandle
    })
}

/// Close the device and free the handle.
///
/// # Safety
/// `handle` must be null or a handle returned by `dfpu_init` that has not
/// been freed.
#[no_mangle]
pub unsafe extern "C" fn dfpu_term(handle: DfpuHandle) {
    crate::ffi_boundary((), || {
        if handle.is_null() {
            return;
        }

        let handle = {
            // SAFETY: Handle was allocated by dfpu_init.
            unsafe { Box::from_raw(handle as *mut DispatcherHandle) }
        };
        handle.dispatcher.terminate();
    });
}

/// `1` while the accelerator is connected, `0` otherwise (or for a null
/// handle).
///
/// # Safety
/// `handle` must be null or a live handle from `dfpu_init`.
#[no_mangle]
pub unsafe extern "C" fn dfpu_is_connected(handle: DfpuHandle) -> i32 {
    crate::ffi_boundary(0, || {
        error::clear_error_state();
        with_dispatcher(handle, 0, |dispatcher| i32::from(dispatcher.is_connected()))
    })
}

/// Run device discovery again. Returns `1` when the accelerator is now
/// connected; on `0` the reason is available from `dfpu_last_error`.
///
/// # Safety
/// `handle` must be null or a live handle from `dfpu_init`.
#[no_mangle]
pub unsafe extern "C" fn dfpu_reconnect(handle: DfpuHandle) -> i32 {
    crate::ffi_boundary(0, || {
        error::clear_error_state();
        with_dispatcher(handle, 0, |dispatcher| match dispatcher.reconnect() {
            Ok(_) => 1,
            Err(err) => {
                error::set_error_message(err.to_string());
                0
            }
        })
    })
}

/// `r[i] = a[i] + b[i]` for every lane.
///
/// # Safety
/// `handle` must be a live handle from `dfpu_init`. `a` and `b` must be
/// readable and `r` writable for `DFPU_LANES` elements.
#[no_mangle]
pub unsafe extern "C" fn dfpu_add_packed(
    handle: DfpuHandle,
    a: *const DfpuDecimal,
    b: *const DfpuDecimal,
    r: *mut DfpuDecimal,
) -> DfpuResult {
    // SAFETY: Forwarded caller contract.
    unsafe { packed_op(handle, Operation::Add, a, b, r) }
}

/// `r[i] = a[i] - b[i]` for every lane.
///
/// # Safety
/// Same contract as `dfpu_add_packed`.
#[no_mangle]
pub unsafe extern "C" fn dfpu_subtract_packed(
    handle: DfpuHandle,
    a: *const DfpuDecimal,
    b: *const DfpuDecimal,
    r: *mut DfpuDecimal,
) -> DfpuResult {
    // SAFETY: Forwarded caller contract.
    unsafe { packed_op(handle, Operation::Subtract, a, b, r) }
}

/// `r[i] = a[i] × b[i]` for every lane.
///
/// # Safety
/// Same contract as `dfpu_add_packed`.
#[no_mangle]
pub unsafe extern "C" fn dfpu_multiply_packed(
    handle: DfpuHandle,
    a: *const DfpuDecimal,
    b: *const DfpuDecimal,
    r: *mut DfpuDecimal,
) -> DfpuResult {
    // SAFETY: Forwarded caller contract.
    unsafe { packed_op(handle, Operation::Multiply, a, b, r) }
}

/// `r[i] = a[i] ÷ b[i]` for every lane; division by zero yields NaN.
///
/// # Safety
/// Same contract as `dfpu_add_packed`.
#[no_mangle]
pub unsafe extern "C" fn dfpu_divide_packed(
    handle: DfpuHandle,
    a: *const DfpuDecimal,
    b: *const DfpuDecimal,
    r: *mut DfpuDecimal,
) -> DfpuResult {
    // SAFETY: Forwarded caller contract.
    unsafe { packed_op(handle, Operation::Divide, a, b, r) }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use dfpu_dispatch::DispatchConfig;
    use dfpu_transport::HidTransport;

    use super::*;
    use crate::dfpu_last_error;

    const A: DfpuDecimal = DfpuDecimal {
        integer_places: 3,
        decimal_places: 2,
        significand: 12345,
    };
    const B: DfpuDecimal = DfpuDecimal {
        integer_places: 1,
        decimal_places: 3,
        significand: 6789,
    };

    /// A handle that never touches real hardware.
    fn software_handle() -> DfpuHandle {
        let handle = DispatcherHandle {
            dispatcher: Dispatcher::with_transport(
                HidTransport::default(),
                DispatchConfig::default(),
            ),
        };
        Box::into_raw(Box::new(handle)) as DfpuHandle
    }

    fn last_error() -> String {
        // SAFETY: dfpu_last_error returns a pointer to a thread-local CString.
        unsafe { CStr::from_ptr(dfpu_last_error()) }
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn add_packed_without_device() {
        let handle = software_handle();
        let a = [A; 4];
        let b = [B; 4];
        let mut r = [DfpuDecimal::default(); 4];

        // SAFETY: Arrays hold DFPU_LANES elements and the handle is live.
        let result = unsafe { dfpu_add_packed(handle, a.as_ptr(), b.as_ptr(), r.as_mut_ptr()) };
        assert_eq!(result, DfpuResult::Ok);
        assert_eq!(
            r,
            [DfpuDecimal {
                integer_places: 3,
                decimal_places: 3,
                significand: 130_239,
            }; 4]
        );

        // SAFETY: Handle is live.
        assert_eq!(unsafe { dfpu_is_connected(handle) }, 0);
        // SAFETY: Handle came from Box::into_raw above.
        unsafe { dfpu_term(handle) };
    }

    #[test]
    fn every_operation_writes_results() {
        let handle = software_handle();
        let a = [A; 4];
        let b = [B; 4];
        let ops: [(unsafe extern "C" fn(_, _, _, _) -> _, i32); 3] = [
            (dfpu_subtract_packed, 116_661),
            (dfpu_multiply_packed, 83_810_205),
            (dfpu_divide_packed, 181_838_268),
        ];

        for (op, expected) in ops {
            let mut r = [DfpuDecimal::default(); 4];
            // SAFETY: Arrays hold DFPU_LANES elements and the handle is live.
            let result = unsafe { op(handle, a.as_ptr(), b.as_ptr(), r.as_mut_ptr()) };
            assert_eq!(result, DfpuResult::Ok);
            assert!(r.iter().all(|lane| lane.significand == expected));
        }

        // SAFETY: Handle came from Box::into_raw above.
        unsafe { dfpu_term(handle) };
    }

    #[test]
    fn null_arguments_are_rejected() {
        let handle = software_handle();
        let a = [A; 4];
        let mut r = [DfpuDecimal::default(); 4];
        let null_in = std::ptr::null();
        let null_out = std::ptr::null_mut();

        // SAFETY: Null pointers are rejected before any access.
        let result = unsafe { dfpu_add_packed(handle, a.as_ptr(), null_in, r.as_mut_ptr()) };
        assert_eq!(result, DfpuResult::InvalidArgument);
        assert_eq!(last_error(), "b cannot be null");

        // SAFETY: As above.
        let result = unsafe { dfpu_add_packed(handle, a.as_ptr(), a.as_ptr(), null_out) };
        assert_eq!(result, DfpuResult::InvalidArgument);
        assert_eq!(r, [DfpuDecimal::default(); 4]);

        let missing = std::ptr::null_mut();
        // SAFETY: As above.
        let result = unsafe { dfpu_add_packed(missing, a.as_ptr(), a.as_ptr(), r.as_mut_ptr()) };
        assert_eq!(result, DfpuResult::InvalidArgument);
        assert_eq!(last_error(), "dfpu handle cannot be null");

        // SAFETY: Handle came from Box::into_raw above.
        unsafe { dfpu_term(handle) };
    }

    #[test]
    fn null_handle_is_tolerated() {
        // SAFETY: Null handles are accepted by every entry point.
        unsafe {
            dfpu_term(std::ptr::null_mut());
            assert_eq!(dfpu_is_connected(std::ptr::null_mut()), 0);
            assert_eq!(dfpu_reconnect(std::ptr::null_mut()), 0);
        }
    }

    #[test]
    fn decimal_conversion_preserves_fields() {
        let value = dfpu_decimal::Decimal::new(2, 7, -181_838_268);
        let c = DfpuDecimal::from(value);
        assert_eq!(dfpu_decimal::Decimal::from(c), value);
    }
}
