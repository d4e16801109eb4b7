use std::time::Duration;

use dfpu_transport::{Direction, ReportTransport};
use tracing::debug;

use crate::codec::{RequestFrame, ResponseFrame, FRAME_SIZE, RESPONSE_SIZE};
use crate::error::{FrameError, Result};

/// Send one request frame and wait for its response.
///
/// Both transfers share `timeout`. Nothing is retried: a failed transfer has
/// already moved the transport to disconnected.
pub fn exchange<T>(
    transport: &T,
    request: &RequestFrame,
    timeout: Duration,
) -> Result<ResponseFrame>
where
    T: ReportTransport + ?Sized,
{
    let written = transport.send(request, timeout)?;
    if written < FRAME_SIZE {
        debug!(written, "short request write");
        return Err(FrameError::Truncated {
            direction: Direction::Send,
            len: written,
            expected: FRAME_SIZE,
        });
    }

    let mut response = [0u8; FRAME_SIZE];
    let read = transport.receive(&mut response, timeout)?;
    if read < RESPONSE_SIZE {
        debug!(read, "short response read");
        return Err(FrameError::Truncated {
            direction: Direction::Receive,
            len: read,
            expected: RESPONSE_SIZE,
        });
    }

    Ok(response)
}
