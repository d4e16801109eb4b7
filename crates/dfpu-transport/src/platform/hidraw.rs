//! Linux hidraw backend.
//!
//! Discovery walks `/sys/class/hidraw`; transfers go through a non-blocking
//! `/dev/hidrawN` descriptor bounded by `poll(2)`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::descriptor::top_level_usage;
use crate::error::{Direction, Result, TransportError};
use crate::filter::DeviceInfo;
use crate::hid::REPORT_ID;
use crate::traits::HidDevice;

const SYSFS_HIDRAW: &str = "/sys/class/hidraw";

pub(crate) fn enumerate() -> io::Result<Vec<DeviceInfo>> {
    let entries = match fs::read_dir(SYSFS_HIDRAW) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut devices = Vec::new();
    for entry in entries {
        let entry = entry?;
        let node = entry.file_name().to_string_lossy().into_owned();
        match describe(&entry.path(), &node) {
            Ok(Some(info)) => devices.push(info),
            Ok(None) => debug!(%node, "hidraw node without usable identity"),
            Err(err) => debug!(%node, error = %err, "skipping hidraw node"),
        }
    }
    devices.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(devices)
}

pub(crate) fn open(info: &DeviceInfo) -> io::Result<Arc<dyn HidDevice>> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NONBLOCK | libc::O_CLOEXEC)
        .open(&info.path)?;
    Ok(Arc::new(HidrawDevice { file }))
}

fn describe(sys_path: &Path, node: &str) -> io::Result<Option<DeviceInfo>> {
    let uevent = fs::read_to_string(sys_path.join("device/uevent"))?;
    let Some((vendor_id, product_id)) = parse_hid_id(&uevent) else {
        return Ok(None);
    };
    let descriptor = fs::read(sys_path.join("device/report_descriptor"))?;
    let Some((usage_page, usage)) = top_level_usage(&descriptor) else {
        return Ok(None);
    };

    Ok(Some(DeviceInfo {
        path: format!("/dev/{node}"),
        vendor_id,
        product_id,
        usage_page,
        usage,
        product: uevent_value(&uevent, "HID_NAME").map(str::to_string),
    }))
}

fn uevent_value<'a>(uevent: &'a str, key: &str) -> Option<&'a str> {
    uevent
        .lines()
        .find_map(|line| line.strip_prefix(key)?.strip_prefix('='))
}

/// Parse `HID_ID=<bus>:<vendor>:<product>` (hex fields).
fn parse_hid_id(uevent: &str) -> Option<(u16, u16)> {
    let mut fields = uevent_value(uevent, "HID_ID")?.split(':');
    let _bus = fields.next()?;
    let vendor = u32::from_str_radix(fields.next()?, 16).ok()?;
    let product = u32::from_str_radix(fields.next()?, 16).ok()?;
    Some((u16::try_from(vendor).ok()?, u16::try_from(product).ok()?))
}

struct HidrawDevice {
    file: File,
}

impl HidrawDevice {
    fn timeout(direction: Direction, after: Duration) -> TransportError {
        TransportError::Timeout { direction, after }
    }

    fn io(direction: Direction, source: io::Error) -> TransportError {
        TransportError::Io { direction, source }
    }
}

impl HidDevice for HidrawDevice {
    fn write_report(&self, report: &[u8], timeout: Duration) -> Result<usize> {
        let deadline = Instant::now() + timeout;
        loop {
            if !wait_ready(self.file.as_raw_fd(), libc::POLLOUT, deadline)
                .map_err(|err| Self::io(Direction::Send, err))?
            {
                return Err(Self::timeout(Direction::Send, timeout));
            }
            match (&self.file).write(report) {
                Ok(n) => return Ok(n),
                Err(err) if is_retryable(&err) => continue,
                Err(err) => return Err(Self::io(Direction::Send, err)),
            }
        }
    }

    fn read_report(&self, report: &mut [u8], timeout: Duration) -> Result<usize> {
        // hidraw delivers unnumbered reports without the id byte.
        let Some((id, payload)) = report.split_first_mut() else {
            return Ok(0);
        };

        let deadline = Instant::now() + timeout;
        loop {
            if !wait_ready(self.file.as_raw_fd(), libc::POLLIN, deadline)
                .map_err(|err| Self::io(Direction::Receive, err))?
            {
                return Err(Self::timeout(Direction::Receive, timeout));
            }
            match (&self.file).read(payload) {
                // Readable but at end of file: the node went away.
                Ok(0) => {
                    return Err(Self::io(
                        Direction::Receive,
                        io::Error::new(ErrorKind::UnexpectedEof, "hidraw device closed"),
                    ))
                }
                Ok(n) => {
                    *id = REPORT_ID;
                    return Ok(n + 1);
                }
                Err(err) if is_retryable(&err) => continue,
                Err(err) => return Err(Self::io(Direction::Receive, err)),
            }
        }
    }
}

fn is_retryable(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted)
}

/// Wait until `events` are ready on `fd` or `deadline` passes.
///
/// Returns `Ok(false)` on expiry.
fn wait_ready(fd: RawFd, events: libc::c_short, deadline: Instant) -> io::Result<bool> {
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let millis = remaining.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
        let mut pfd = libc::pollfd {
            fd,
            events,
            revents: 0,
        };

        // SAFETY: `pfd` is a valid, writable pollfd and nfds is 1.
        let rc = unsafe { libc::poll(&mut pfd, 1, millis) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if rc == 0 {
            return Ok(false);
        }
        if pfd.revents & events != 0 {
            return Ok(true);
        }
        return Err(io::Error::new(
            ErrorKind::BrokenPipe,
            "hidraw device hung up",
        ));
    }
}
