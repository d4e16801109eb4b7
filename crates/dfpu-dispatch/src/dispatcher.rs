use std::fmt;

use dfpu_decimal::{Decimal, Packed, LANES};
use dfpu_frame::{decode_response, encode_request, exchange, Operation};
use dfpu_transport::{DeviceInfo, HidTransport, ReportTransport, TransportError};
use tracing::{debug, info, warn};

use crate::config::DispatchConfig;

/// How a dispatched operation was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The accelerator computed the lanes.
    Accelerator,
    /// No device was connected; the lanes were computed locally.
    Software,
    /// The exchange with the accelerator failed part way. The lanes are
    /// zeroed and the device is now disconnected.
    Aborted,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accelerator => "accelerator",
            Self::Software => "software",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result lanes of one operation and the route that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub lanes: Packed,
    pub route: Route,
}

/// Routes packed decimal operations to the accelerator when it is connected
/// and to the local decimal arithmetic otherwise.
///
/// ```no_run
/// use dfpu_decimal::Decimal;
/// use dfpu_dispatch::Dispatcher;
///
/// let dfpu = Dispatcher::init();
/// let a = [Decimal::new(3, 2, 12345); 4];
/// let b = [Decimal::new(1, 3, 6789); 4];
/// let sum = dfpu.add(&a, &b);
/// assert_eq!(sum[0], Decimal::new(3, 3, 130239));
/// ```
pub struct Dispatcher<T: ReportTransport = HidTransport> {
    transport: T,
    config: DispatchConfig,
}

impl Dispatcher<HidTransport> {
    /// Look for the accelerator with the default configuration.
    ///
    /// Never fails: without a device every operation runs in software.
    pub fn init() -> Self {
        Self::init_with_config(DispatchConfig::default())
    }

    /// Look for the accelerator with an explicit configuration.
    pub fn init_with_config(config: DispatchConfig) -> Self {
        let dispatcher = Self::with_transport(HidTransport::new(config.filter), config);
        let _ = dispatcher.reconnect();
        dispatcher
    }

    /// Run discovery again, replacing any current connection.
    pub fn reconnect(&self) -> dfpu_transport::Result<DeviceInfo> {
        match self.transport.open() {
            Ok(device) => {
                info!(device = %device, "accelerator connected");
                Ok(device)
            }
            Err(err @ TransportError::NoDeviceFound { .. }) => {
                info!("no accelerator found, computing in software");
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, "accelerator discovery failed, computing in software");
                Err(err)
            }
        }
    }
}

impl<T: ReportTransport> Dispatcher<T> {
    /// Dispatch over an already prepared transport.
    pub fn with_transport(transport: T, config: DispatchConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Release the device. Later operations run in software.
    pub fn terminate(&self) {
        self.transport.close();
    }

    pub fn add(&self, a: &Packed, b: &Packed) -> Packed {
        self.dispatch(Operation::Add, a, b).lanes
    }

    pub fn subtract(&self, a: &Packed, b: &Packed) -> Packed {
        self.dispatch(Operation::Subtract, a, b).lanes
    }

    pub fn multiply(&self, a: &Packed, b: &Packed) -> Packed {
        self.dispatch(Operation::Multiply, a, b).lanes
    }

    pub fn divide(&self, a: &Packed, b: &Packed) -> Packed {
        self.dispatch(Operation::Divide, a, b).lanes
    }

    /// Apply `operation` lane by lane and report which route was taken.
    ///
    /// A failed exchange is not retried within the call.
    pub fn dispatch(&self, operation: Operation, a: &Packed, b: &Packed) -> Dispatch {
        if self.transport.is_connected() {
            let request = encode_request(operation, a, b);
            match exchange(&self.transport, &request, self.config.timeout) {
                Ok(response) => {
                    debug!(%operation, "computed on accelerator");
                    Dispatch {
                        lanes: decode_response(&response),
                        route: Route::Accelerator,
                    }
                }
                Err(err) => {
                    warn!(%operation, error = %err, "accelerator exchange failed, result zeroed");
                    Dispatch {
                        lanes: [Decimal::default(); LANES],
                        route: Route::Aborted,
                    }
                }
            }
        } else {
            Dispatch {
                lanes: operation.apply_packed(a, b),
                route: Route::Software,
            }
        }
    }
}

impl Default for Dispatcher<HidTransport> {
    fn default() -> Self {
        Self::with_transport(HidTransport::default(), DispatchConfig::default())
    }
}

impl<T: ReportTransport + fmt::Debug> fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("transport", &self.transport)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}
