use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Direction, Result, TransportError};
use crate::filter::{DeviceFilter, DeviceInfo};
use crate::platform;
use crate::state::{ConnectionState, SharedState};
use crate::traits::{HidDevice, ReportTransport};

/// Report id prefixed to every transfer. The accelerator uses unnumbered
/// reports.
pub const REPORT_ID: u8 = 0;

/// Payload bytes per accelerator report.
pub const REPORT_PAYLOAD_SIZE: usize = 64;

/// Upper bound on report id + payload for a single transfer.
pub const SCRATCH_CAPACITY: usize = 516;

struct Connection {
    info: DeviceInfo,
    device: Arc<dyn HidDevice>,
}

/// HID transport to one accelerator.
///
/// Owns the device handle, the connection state and one lock per transfer
/// direction. Any failed or timed-out transfer drops the state to
/// [`ConnectionState::Disconnected`]; call [`HidTransport::open`] again to
/// reconnect.
pub struct HidTransport {
    filter: DeviceFilter,
    connection: RwLock<Option<Connection>>,
    state: SharedState,
    send_lock: Mutex<()>,
    receive_lock: Mutex<()>,
}

impl HidTransport {
    /// Create a disconnected transport for devices matching `filter`.
    pub fn new(filter: DeviceFilter) -> Self {
        Self {
            filter,
            connection: RwLock::new(None),
            state: SharedState::new(),
            send_lock: Mutex::new(()),
            receive_lock: Mutex::new(()),
        }
    }

    /// Discover and open the first device matching the filter.
    ///
    /// Any previously open device is closed first. `NoDeviceFound` is the
    /// normal outcome on a host without the accelerator.
    pub fn open(&self) -> Result<DeviceInfo> {
        self.close();

        let candidates: Vec<DeviceInfo> = enumerate()?
            .into_iter()
            .filter(|info| self.filter.matches(info))
            .collect();

        for info in candidates {
            match platform::open(&info) {
                Ok(device) => {
                    self.attach(device, info.clone());
                    return Ok(info);
                }
                Err(err) => {
                    debug!(path = %info.path, error = %err, "matching device could not be opened");
                }
            }
        }

        debug!(
            vendor_id = self.filter.vendor_id,
            product_id = self.filter.product_id,
            "no matching device"
        );
        Err(TransportError::NoDeviceFound {
            vendor_id: self.filter.vendor_id,
            product_id: self.filter.product_id,
        })
    }

    /// Adopt an already-open device and mark the transport connected.
    pub fn attach(&self, device: Arc<dyn HidDevice>, info: DeviceInfo) {
        info!(device = %info, "device connected");
        *self
            .connection
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Connection { info, device });
        self.state.swap(ConnectionState::Connected);
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state.load()
    }

    /// Identity of the connected device, if any.
    pub fn device_info(&self) -> Option<DeviceInfo> {
        if self.state() != ConnectionState::Connected {
            return None;
        }
        self.connection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|conn| conn.info.clone())
    }

    /// The filter used by [`HidTransport::open`].
    pub fn filter(&self) -> &DeviceFilter {
        &self.filter
    }

    fn connected_device(&self) -> Result<Arc<dyn HidDevice>> {
        if self.state() != ConnectionState::Connected {
            return Err(TransportError::NotConnected);
        }
        self.connection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|conn| Arc::clone(&conn.device))
            .ok_or(TransportError::NotConnected)
    }

    /// Record a transfer failure on `device`: it is considered gone.
    ///
    /// A device that was already replaced by `open` or `attach` leaves the
    /// current connection alone.
    fn fail<T>(&self, device: &Arc<dyn HidDevice>, err: TransportError) -> Result<T> {
        let connection = self
            .connection
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let current = match connection.as_ref() {
            Some(conn) => std::ptr::addr_eq(Arc::as_ptr(&conn.device), Arc::as_ptr(device)),
            None => false,
        };
        if current && self.state.swap(ConnectionState::Disconnected) == ConnectionState::Connected {
            warn!(error = %err, "transfer failed, device disconnected");
        }
        Err(err)
    }
}

impl ReportTransport for HidTransport {
    fn send(&self, payload: &[u8], timeout: Duration) -> Result<usize> {
        check_capacity(payload.len())?;
        let device = self.connected_device()?;
        let _guard = lock(&self.send_lock);

        let mut scratch = [0u8; SCRATCH_CAPACITY];
        let report = &mut scratch[..payload.len() + 1];
        report[0] = REPORT_ID;
        report[1..].copy_from_slice(payload);

        match device.write_report(report, timeout) {
            Ok(written) if written <= 1 => self.fail(
                &device,
                TransportError::EmptyReport {
                    direction: Direction::Send,
                },
            ),
            Ok(written) => {
                debug!(bytes = written - 1, "report sent");
                Ok(written - 1)
            }
            Err(err) => self.fail(&device, err),
        }
    }

    fn receive(&self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        check_capacity(buf.len())?;
        let device = self.connected_device()?;
        let _guard = lock(&self.receive_lock);

        let mut scratch = [0u8; SCRATCH_CAPACITY];
        let report = &mut scratch[..buf.len() + 1];

        match device.read_report(report, timeout) {
            Ok(read) if read <= 1 => self.fail(
                &device,
                TransportError::EmptyReport {
                    direction: Direction::Receive,
                },
            ),
            Ok(read) => {
                let n = (read - 1).min(buf.len());
                buf[..n].copy_from_slice(&report[1..=n]);
                debug!(bytes = n, "report received");
                Ok(n)
            }
            Err(err) => self.fail(&device, err),
        }
    }

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    fn close(&self) {
        let previous = self
            .connection
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.state.swap(ConnectionState::Disconnected);
        if let Some(conn) = previous {
            info!(device = %conn.info, "device closed");
        }
    }
}

impl Default for HidTransport {
    fn default() -> Self {
        Self::new(DeviceFilter::default())
    }
}

impl std::fmt::Debug for HidTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidTransport")
            .field("filter", &self.filter)
            .field("state", &self.state())
            .finish()
    }
}

/// List every HID device the host exposes.
pub fn enumerate() -> Result<Vec<DeviceInfo>> {
    platform::enumerate().map_err(TransportError::Discovery)
}

fn check_capacity(len: usize) -> Result<()> {
    if len + 1 > SCRATCH_CAPACITY {
        return Err(TransportError::Oversized {
            len: len + 1,
            max: SCRATCH_CAPACITY,
        });
    }
    Ok(())
}

fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
