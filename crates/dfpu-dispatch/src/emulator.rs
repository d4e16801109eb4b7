//! Software stand-in for the accelerator firmware.
//!
//! Answers request frames the way the device does: decode, compute each lane
//! with the decimal arithmetic, encode the results.

use std::sync::Arc;

use dfpu_frame::{decode_request, encode_response, FRAME_SIZE};
use dfpu_transport::{DeviceFilter, DeviceInfo, HidTransport, LoopbackDevice};
use tracing::debug;

/// Response payload for one request payload, or `None` when the request
/// cannot be decoded (the firmware stays silent then).
pub fn respond(payload: &[u8]) -> Option<Vec<u8>> {
    let mut frame = [0u8; FRAME_SIZE];
    let n = payload.len().min(FRAME_SIZE);
    frame[..n].copy_from_slice(&payload[..n]);

    match decode_request(&frame) {
        Ok(request) => {
            let results = request.operation.apply_packed(&request.a, &request.b);
            Some(encode_response(&results).to_vec())
        }
        Err(err) => {
            debug!(error = %err, "emulator ignoring request");
            None
        }
    }
}

/// A loopback device answering like the accelerator.
pub fn device() -> LoopbackDevice {
    LoopbackDevice::new(respond)
}

/// Identity the emulated device reports.
pub fn device_info() -> DeviceInfo {
    DeviceInfo {
        path: "emulator".to_string(),
        vendor_id: DeviceFilter::DFPU_VENDOR_ID,
        product_id: DeviceFilter::DFPU_PRODUCT_ID,
        usage_page: DeviceFilter::DFPU_USAGE_PAGE,
        usage: DeviceFilter::DFPU_USAGE,
        product: Some("DFPU emulator".to_string()),
    }
}

/// A connected transport backed by `device`.
pub fn attach(device: Arc<LoopbackDevice>) -> HidTransport {
    let transport = HidTransport::default();
    transport.attach(device, device_info());
    transport
}

/// A connected transport backed by a fresh emulated device.
pub fn transport() -> HidTransport {
    attach(Arc::new(device()))
}

#[cfg(test)]
mod tests {
    use dfpu_decimal::Decimal;
    use dfpu_frame::{decode_response, encode_request, Operation};
    use dfpu_transport::ReportTransport;

    use super::*;

    #[test]
    fn answers_a_request_frame() {
        let a = [Decimal::new(3, 2, 12345); 4];
        let b = [Decimal::new(1, 3, 6789); 4];
        let request = encode_request(Operation::Subtract, &a, &b);

        let payload = respond(&request).unwrap();
        assert_eq!(payload.len(), FRAME_SIZE);
        let mut response = [0u8; FRAME_SIZE];
        response.copy_from_slice(&payload);
        assert_eq!(decode_response(&response), [Decimal::new(3, 3, 116_661); 4]);
    }

    #[test]
    fn ignores_unknown_operation() {
        let mut request = [0u8; FRAME_SIZE];
        request[0] = 0x7F;
        assert!(respond(&request).is_none());
    }

    #[test]
    fn emulated_transport_matches_accelerator_filter() {
        let transport = transport();
        assert!(transport.is_connected());
        let info = transport.device_info().unwrap();
        assert!(DeviceFilter::default().matches(&info));
    }
}
