//! Windows HID backend.
//!
//! Discovery enumerates the HID device interface class through SetupAPI and
//! reads vendor/product ids and top-level usages through `hid.dll`. Transfers
//! use overlapped I/O with one manual-reset event per direction.

use std::io;
use std::mem::{offset_of, size_of, zeroed};
use std::os::windows::io::{AsRawHandle, FromRawHandle, OwnedHandle};
use std::ptr::{null, null_mut};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use windows_sys::core::GUID;
use windows_sys::Win32::Devices::DeviceAndDriverInstallation::{
    SetupDiDestroyDeviceInfoList, SetupDiEnumDeviceInterfaces, SetupDiGetClassDevsW,
    SetupDiGetDeviceInterfaceDetailW, DIGCF_DEVICEINTERFACE, DIGCF_PRESENT, HDEVINFO,
    SP_DEVICE_INTERFACE_DATA, SP_DEVICE_INTERFACE_DETAIL_DATA_W,
};
use windows_sys::Win32::Devices::HumanInterfaceDevice::{
    HidD_FreePreparsedData, HidD_GetAttributes, HidD_GetHidGuid, HidD_GetPreparsedData,
    HidP_GetCaps, HIDD_ATTRIBUTES, HIDP_CAPS, HIDP_STATUS_SUCCESS, PHIDP_PREPARSED_DATA,
};
use windows_sys::Win32::Foundation::{
    GetLastError, ERROR_IO_PENDING, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
    WAIT_OBJECT_0, WAIT_TIMEOUT,
};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, ReadFile, WriteFile, FILE_FLAG_OVERLAPPED, FILE_SHARE_READ, FILE_SHARE_WRITE,
    OPEN_EXISTING,
};
use windows_sys::Win32::System::Threading::{CreateEventW, ResetEvent, WaitForSingleObject};
use windows_sys::Win32::System::IO::{CancelIo, GetOverlappedResult, OVERLAPPED};

use crate::error::{Direction, Result, TransportError};
use crate::filter::DeviceInfo;
use crate::traits::HidDevice;

/// Device information set returned by SetupAPI, destroyed on drop.
struct DeviceInfoSet(HDEVINFO);

impl Drop for DeviceInfoSet {
    fn drop(&mut self) {
        // SAFETY: the set was returned by SetupDiGetClassDevsW and is destroyed once.
        unsafe {
            SetupDiDestroyDeviceInfoList(self.0);
        }
    }
}

pub(crate) fn enumerate() -> io::Result<Vec<DeviceInfo>> {
    // SAFETY: GUID is plain data; HidD_GetHidGuid fills it in.
    let mut guid: GUID = unsafe { zeroed() };
    unsafe { HidD_GetHidGuid(&mut guid) };

    // SAFETY: `guid` is valid for the call; null enumerator/parent are allowed.
    let raw_set = unsafe {
        SetupDiGetClassDevsW(
            &guid,
            null(),
            null_mut(),
            DIGCF_PRESENT | DIGCF_DEVICEINTERFACE,
        )
    };
    if raw_set as isize == INVALID_HANDLE_VALUE as isize {
        return Err(io::Error::last_os_error());
    }
    let set = DeviceInfoSet(raw_set);

    let mut devices = Vec::new();
    for index in 0u32.. {
        // SAFETY: SP_DEVICE_INTERFACE_DATA is plain data.
        let mut iface: SP_DEVICE_INTERFACE_DATA = unsafe { zeroed() };
        iface.cbSize = size_of::<SP_DEVICE_INTERFACE_DATA>() as u32;

        // SAFETY: all pointers reference live locals; the set is open.
        let found =
            unsafe { SetupDiEnumDeviceInterfaces(set.0, null(), &guid, index, &mut iface) };
        if found == 0 {
            break;
        }

        let Some(path) = interface_path(&set, &iface) else {
            continue;
        };
        match describe(&path) {
            Some(info) => devices.push(info),
            None => debug!(%path, "skipping HID interface without attributes"),
        }
    }
    Ok(devices)
}

pub(crate) fn open(info: &DeviceInfo) -> io::Result<Arc<dyn HidDevice>> {
    let handle = create_file(
        &info.path,
        GENERIC_READ | GENERIC_WRITE,
        FILE_FLAG_OVERLAPPED,
    )?;
    Ok(Arc::new(WindowsHidDevice {
        handle,
        send_event: manual_reset_event()?,
        receive_event: manual_reset_event()?,
    }))
}

fn interface_path(set: &DeviceInfoSet, iface: &SP_DEVICE_INTERFACE_DATA) -> Option<String> {
    let mut required = 0u32;
    // SAFETY: size query with a null detail buffer, as documented.
    unsafe {
        SetupDiGetDeviceInterfaceDetailW(set.0, iface, null_mut(), 0, &mut required, null_mut());
    }
    let offset = offset_of!(SP_DEVICE_INTERFACE_DETAIL_DATA_W, DevicePath);
    if (required as usize) <= offset {
        return None;
    }

    // u64 words keep the detail struct suitably aligned.
    let mut buffer = vec![0u64; (required as usize).div_ceil(size_of::<u64>())];
    let detail = buffer.as_mut_ptr().cast::<SP_DEVICE_INTERFACE_DETAIL_DATA_W>();
    // SAFETY: `buffer` holds at least `required` bytes, enough for the header.
    unsafe {
        (*detail).cbSize = size_of::<SP_DEVICE_INTERFACE_DETAIL_DATA_W>() as u32;
    }

    // SAFETY: `detail` points at `required` writable bytes.
    let ok = unsafe {
        SetupDiGetDeviceInterfaceDetailW(set.0, iface, detail, required, null_mut(), null_mut())
    };
    if ok == 0 {
        return None;
    }

    let chars = (required as usize - offset) / size_of::<u16>();
    // SAFETY: DevicePath starts at `offset` and the call filled `chars` UTF-16 units.
    let wide = unsafe {
        std::slice::from_raw_parts(
            buffer.as_ptr().cast::<u8>().add(offset).cast::<u16>(),
            chars,
        )
    };
    let len = wide.iter().position(|&c| c == 0).unwrap_or(chars);
    Some(String::from_utf16_lossy(&wide[..len]))
}

fn describe(path: &str) -> Option<DeviceInfo> {
    // No access rights are needed for attribute queries, which also lets us
    // inspect devices the system holds exclusively (keyboards, mice).
    let handle = create_file(path, 0, 0).ok()?;
    let raw = handle.as_raw_handle() as HANDLE;

    // SAFETY: HIDD_ATTRIBUTES is plain data sized below.
    let mut attributes: HIDD_ATTRIBUTES = unsafe { zeroed() };
    attributes.Size = size_of::<HIDD_ATTRIBUTES>() as u32;
    // SAFETY: `raw` is an open HID handle; `attributes` is writable.
    if unsafe { HidD_GetAttributes(raw, &mut attributes) } == 0 {
        return None;
    }

    // SAFETY: zero is the documented "no data" value for the preparsed handle.
    let mut preparsed: PHIDP_PREPARSED_DATA = unsafe { zeroed() };
    // SAFETY: `raw` is open; `preparsed` receives an allocation freed below.
    if unsafe { HidD_GetPreparsedData(raw, &mut preparsed) } == 0 {
        return None;
    }
    // SAFETY: HIDP_CAPS is plain data.
    let mut caps: HIDP_CAPS = unsafe { zeroed() };
    // SAFETY: `preparsed` came from HidD_GetPreparsedData and is freed exactly once.
    let status = unsafe { HidP_GetCaps(preparsed, &mut caps) };
    unsafe { HidD_FreePreparsedData(preparsed) };
    if status != HIDP_STATUS_SUCCESS {
        return None;
    }

    Some(DeviceInfo {
        path: path.to_string(),
        vendor_id: attributes.VendorID,
        product_id: attributes.ProductID,
        usage_page: caps.UsagePage,
        usage: caps.Usage,
        product: None,
    })
}

fn create_file(path: &str, access: u32, flags: u32) -> io::Result<OwnedHandle> {
    let wide: Vec<u16> = path.encode_utf16().chain(std::iter::once(0)).collect();
    // SAFETY: `wide` is NUL-terminated and outlives the call.
    let handle = unsafe {
        CreateFileW(
            wide.as_ptr(),
            access,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            null(),
            OPEN_EXISTING,
            flags,
            null_mut(),
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `handle` is a freshly opened handle owned by nobody else.
    Ok(unsafe { OwnedHandle::from_raw_handle(handle) })
}

fn manual_reset_event() -> io::Result<OwnedHandle> {
    // SAFETY: default security, manual reset, initially signaled, unnamed.
    let event = unsafe { CreateEventW(null(), 1, 1, null()) };
    if event.is_null() {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `event` is a freshly created handle owned by nobody else.
    Ok(unsafe { OwnedHandle::from_raw_handle(event) })
}

struct WindowsHidDevice {
    handle: OwnedHandle,
    send_event: OwnedHandle,
    receive_event: OwnedHandle,
}

impl WindowsHidDevice {
    /// Run one overlapped transfer started by `start`, waiting on `event`.
    ///
    /// Every exit path waits for the I/O to finish or be cancelled, so the
    /// OVERLAPPED block and the caller's buffer outlive the operation.
    fn overlapped(
        &self,
        event: &OwnedHandle,
        direction: Direction,
        timeout: Duration,
        start: impl FnOnce(HANDLE, *mut OVERLAPPED) -> i32,
    ) -> Result<usize> {
        let handle = self.handle.as_raw_handle() as HANDLE;
        let event = event.as_raw_handle() as HANDLE;

        // SAFETY: OVERLAPPED is plain data.
        let mut ov: OVERLAPPED = unsafe { zeroed() };
        ov.hEvent = event;
        // SAFETY: `event` is owned by this device.
        unsafe { ResetEvent(event) };

        if start(handle, &mut ov) == 0 {
            // SAFETY: reads the calling thread's last error code.
            let code = unsafe { GetLastError() };
            if code != ERROR_IO_PENDING {
                return Err(TransportError::Io {
                    direction,
                    source: io::Error::from_raw_os_error(code as i32),
                });
            }

            let millis = timeout.as_millis().min(u128::from(u32::MAX - 1)) as u32;
            // SAFETY: `event` stays valid for the wait.
            match unsafe { WaitForSingleObject(event, millis) } {
                WAIT_OBJECT_0 => {}
                WAIT_TIMEOUT => {
                    cancel(handle, &ov);
                    return Err(TransportError::Timeout {
                        direction,
                        after: timeout,
                    });
                }
                _ => {
                    let source = io::Error::last_os_error();
                    cancel(handle, &ov);
                    return Err(TransportError::Io { direction, source });
                }
            }
        }

        let mut transferred = 0u32;
        // SAFETY: the operation has completed; `ov` is the block it used.
        if unsafe { GetOverlappedResult(handle, &ov, &mut transferred, 0) } == 0 {
            return Err(TransportError::Io {
                direction,
                source: io::Error::last_os_error(),
            });
        }
        Ok(transferred as usize)
    }
}

fn cancel(handle: HANDLE, ov: &OVERLAPPED) {
    let mut ignored = 0u32;
    // SAFETY: cancels I/O issued by this thread on `handle`, then blocks until
    // the kernel is done with `ov`.
    unsafe {
        CancelIo(handle);
        GetOverlappedResult(handle, ov, &mut ignored, 1);
    }
}

impl HidDevice for WindowsHidDevice {
    fn write_report(&self, report: &[u8], timeout: Duration) -> Result<usize> {
        self.overlapped(&self.send_event, Direction::Send, timeout, |handle, ov| {
            // SAFETY: `report` outlives the transfer (see `overlapped`).
            unsafe {
                WriteFile(
                    handle,
                    report.as_ptr(),
                    report.len() as u32,
                    null_mut(),
                    ov,
                )
            }
        })
    }

    fn read_report(&self, report: &mut [u8], timeout: Duration) -> Result<usize> {
        let len = report.len() as u32;
        let buf = report.as_mut_ptr();
        self.overlapped(
            &self.receive_event,
            Direction::Receive,
            timeout,
            |handle, ov| {
                // SAFETY: `report` outlives the transfer (see `overlapped`).
                unsafe { ReadFile(handle, buf, len, null_mut(), ov) }
            },
        )
    }
}
