use std::time::Duration;

use crate::error::Result;

/// Byte-oriented, timeout-bounded report exchange with one device.
///
/// Methods take `&self` so one thread can send while another receives.
/// Implementations serialize callers within a direction.
pub trait ReportTransport: Send + Sync {
    /// Write `payload` as one report. Returns the payload bytes written.
    fn send(&self, payload: &[u8], timeout: Duration) -> Result<usize>;

    /// Read one report into `buf`. Returns the payload bytes copied.
    fn receive(&self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Whether a device is currently connected.
    fn is_connected(&self) -> bool;

    /// Release the device. Idempotent.
    fn close(&self);
}

/// An open HID device handle, as provided by a host backend.
///
/// Reports are whole: byte 0 is the report id, followed by the payload.
/// Both calls block for at most `timeout` and report expiry as
/// [`TransportError::Timeout`](crate::TransportError::Timeout), having
/// cancelled whatever I/O was still pending.
pub trait HidDevice: Send + Sync {
    /// Write one output report. Returns the number of bytes written,
    /// report id included.
    fn write_report(&self, report: &[u8], timeout: Duration) -> Result<usize>;

    /// Read one input report. Returns the number of bytes read, report id
    /// included.
    fn read_report(&self, report: &mut [u8], timeout: Duration) -> Result<usize>;
}
