//! Fixed-size request/response frames for the DFPU accelerator.
//!
//! Every request is one 64-byte report:
//! - 1 byte operation code
//! - 4 lanes of `a[i]`, `b[i]`, 6 bytes each (integer places, decimal
//!   places, little-endian `i32` significand)
//! - zero padding
//!
//! Every response is one 64-byte report holding 4 result lanes. No length
//! prefixes, no variable-width fields.

pub mod codec;
pub mod error;
pub mod exchange;
pub mod operation;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, Request, RequestFrame,
    ResponseFrame, FRAME_SIZE, LANE_SIZE, REQUEST_SIZE, RESPONSE_SIZE,
};
pub use error::{FrameError, Result};
pub use exchange::exchange;
pub use operation::Operation;
