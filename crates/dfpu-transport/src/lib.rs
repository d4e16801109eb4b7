//! USB HID transport for the DFPU accelerator.
//!
//! Provides discovery of the accelerator among the host's HID devices and
//! synchronized, timeout-bounded report transfers:
//! - Linux: hidraw (`/dev/hidrawN`, `poll(2)`)
//! - Windows: HID class driver with overlapped I/O
//!
//! This is the lowest layer of dfpu. Everything else builds on top of the
//! [`ReportTransport`] trait and the [`HidTransport`] type provided here.

pub mod descriptor;
pub mod error;
pub mod filter;
pub mod hid;
pub mod loopback;
mod platform;
pub mod state;
pub mod traits;

pub use error::{status_code, Direction, Result, TransportError};
pub use filter::{DeviceFilter, DeviceInfo};
pub use hid::{enumerate, HidTransport, REPORT_ID, REPORT_PAYLOAD_SIZE, SCRATCH_CAPACITY};
pub use loopback::LoopbackDevice;
pub use state::ConnectionState;
pub use traits::{HidDevice, ReportTransport};
