//! Packed decimal arithmetic with hardware offload.
//!
//! This is the "just works" layer. A [`Dispatcher`] owns the transport to the
//! accelerator; while the device is connected each operation is one
//! request/response exchange, otherwise the lanes are computed locally.
//! Transport failures never reach the caller: they disconnect the device and
//! later calls fall back to software.

pub mod config;
pub mod dispatcher;
pub mod emulator;

pub use config::{DispatchConfig, DEFAULT_TIMEOUT};
pub use dispatcher::{Dispatch, Dispatcher, Route};
