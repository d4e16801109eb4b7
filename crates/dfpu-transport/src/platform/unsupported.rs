use std::io;
use std::sync::Arc;

use crate::filter::DeviceInfo;
use crate::traits::HidDevice;

pub(crate) fn enumerate() -> io::Result<Vec<DeviceInfo>> {
    Ok(Vec::new())
}

pub(crate) fn open(info: &DeviceInfo) -> io::Result<Arc<dyn HidDevice>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("no HID backend on {}: {}", std::env::consts::OS, info.path),
    ))
}
