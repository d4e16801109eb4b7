//! Host HID backends.
//!
//! Each backend provides `enumerate`, listing every HID top-level collection
//! it can see, and `open`, returning a [`HidDevice`](crate::HidDevice) for one
//! of them.

#[cfg(target_os = "linux")]
mod hidraw;
#[cfg(target_os = "linux")]
pub(crate) use hidraw::{enumerate, open};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use self::windows::{enumerate, open};

#[cfg(not(any(target_os = "linux", windows)))]
mod unsupported;
#[cfg(not(any(target_os = "linux", windows)))]
pub(crate) use unsupported::{enumerate, open};
