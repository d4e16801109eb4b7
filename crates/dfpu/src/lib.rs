//! Packed decimal arithmetic offloaded to a USB HID accelerator.
//!
//! dfpu sends four-lane decimal operations to a DFPU device over raw HID and
//! computes them in software whenever no device is attached.
//!
//! # Crate Structure
//!
//! - [`decimal`]: Fixed-point decimal values and their arithmetic
//! - [`transport`]: HID discovery and timeout-bounded report transfers
//! - [`frame`]: Fixed 64-byte request/response frames
//! - [`dispatch`]: Hardware/software routing (behind `dispatch` feature)

/// Re-export decimal types.
pub mod decimal {
    pub use dfpu_decimal::*;
}

/// Re-export transport types.
pub mod transport {
    pub use dfpu_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use dfpu_frame::*;
}

/// Re-export dispatch types (requires `dispatch` feature).
#[cfg(feature = "dispatch")]
pub mod dispatch {
    pub use dfpu_dispatch::*;
}
