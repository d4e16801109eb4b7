use std::time::Duration;

use dfpu_transport::DeviceFilter;

/// Per-transfer timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Bound on each send and each receive of an exchange.
    pub timeout: Duration,
    /// Which HID device counts as the accelerator.
    pub filter: DeviceFilter,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            filter: DeviceFilter::default(),
        }
    }
}
