use std::fmt;

/// Identity of one HID device (top-level collection) visible to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Backend-specific path used to open the device.
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage_page: u16,
    pub usage: u16,
    /// Product string, when the host exposes one.
    pub product: Option<String>,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} usage {:04x}:{:04x} at {}",
            self.vendor_id, self.product_id, self.usage_page, self.usage, self.path
        )
    }
}

/// Selects the accelerator among the host's HID devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFilter {
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage_page: u16,
    pub usage: u16,
}

impl DeviceFilter {
    /// Teensy raw-HID vendor id.
    pub const DFPU_VENDOR_ID: u16 = 0x16C0;
    /// Teensy raw-HID product id.
    pub const DFPU_PRODUCT_ID: u16 = 0x0486;
    /// Vendor-defined usage page of the raw-HID interface.
    pub const DFPU_USAGE_PAGE: u16 = 0xFFAB;
    pub const DFPU_USAGE: u16 = 0x0200;

    pub fn matches(&self, info: &DeviceInfo) -> bool {
        info.vendor_id == self.vendor_id
            && info.product_id == self.product_id
            && info.usage_page == self.usage_page
            && info.usage == self.usage
    }
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self {
            vendor_id: Self::DFPU_VENDOR_ID,
            product_id: Self::DFPU_PRODUCT_ID,
            usage_page: Self::DFPU_USAGE_PAGE,
            usage: Self::DFPU_USAGE,
        }
    }
}
