use bytes::{Buf, BufMut};
use dfpu_decimal::{Decimal, Packed, LANES};
use dfpu_transport::REPORT_PAYLOAD_SIZE;

use crate::error::Result;
use crate::operation::Operation;

/// Size of every request and response frame (one HID report payload).
pub const FRAME_SIZE: usize = REPORT_PAYLOAD_SIZE;

/// Wire size of one decimal: integer places, decimal places, significand.
pub const LANE_SIZE: usize = 6;

/// Bytes of a request frame that carry data; the rest is zero padding.
pub const REQUEST_SIZE: usize = 1 + 2 * LANES * LANE_SIZE;

/// Bytes of a response frame that carry results.
pub const RESPONSE_SIZE: usize = LANES * LANE_SIZE;

pub type RequestFrame = [u8; FRAME_SIZE];
pub type ResponseFrame = [u8; FRAME_SIZE];

/// A decoded request, as seen by the accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    pub a: Packed,
    pub b: Packed,
}

/// Encode a request into the wire format.
///
/// Wire format:
/// ```text
/// ┌────┬──────┬──────┬──────┬──────┬──────┬──────┬──────┬──────┬─────────┐
/// │ op │ a[0] │ b[0] │ a[1] │ b[1] │ a[2] │ b[2] │ a[3] │ b[3] │ padding │
/// │ 1B │  6B  │  6B  │  6B  │  6B  │  6B  │  6B  │  6B  │  6B  │   15B   │
/// └────┴──────┴──────┴──────┴──────┴──────┴──────┴──────┴──────┴─────────┘
/// lane: integer places (1B) │ decimal places (1B) │ significand (4B LE)
/// ```
pub fn encode_request(operation: Operation, a: &Packed, b: &Packed) -> RequestFrame {
    let mut frame = [0u8; FRAME_SIZE];
    let mut dst = &mut frame[..];
    dst.put_u8(operation.code());
    for (lhs, rhs) in a.iter().zip(b) {
        put_decimal(&mut dst, *lhs);
        put_decimal(&mut dst, *rhs);
    }
    frame
}

/// Decode the result lanes of a response frame. Bytes past the fourth lane
/// are ignored.
pub fn decode_response(frame: &ResponseFrame) -> Packed {
    let mut src = &frame[..];
    std::array::from_fn(|_| get_decimal(&mut src))
}

/// Decode a request frame (accelerator side).
pub fn decode_request(frame: &RequestFrame) -> Result<Request> {
    let mut src = &frame[..];
    let operation = Operation::try_from(src.get_u8())?;

    let mut a = [Decimal::default(); LANES];
    let mut b = [Decimal::default(); LANES];
    for (lhs, rhs) in a.iter_mut().zip(b.iter_mut()) {
        *lhs = get_decimal(&mut src);
        *rhs = get_decimal(&mut src);
    }

    Ok(Request { operation, a, b })
}

/// Encode result lanes into a response frame (accelerator side).
pub fn encode_response(results: &Packed) -> ResponseFrame {
    let mut frame = [0u8; FRAME_SIZE];
    let mut dst = &mut frame[..];
    for value in results {
        put_decimal(&mut dst, *value);
    }
    frame
}

fn put_decimal<B: BufMut>(dst: &mut B, value: Decimal) {
    dst.put_u8(value.integer_places);
    dst.put_u8(value.decimal_places);
    dst.put_i32_le(value.significand);
}

fn get_decimal<B: Buf>(src: &mut B) -> Decimal {
    let integer_places = src.get_u8();
    let decimal_places = src.get_u8();
    let significand = src.get_i32_le();
    Decimal::new(integer_places, decimal_places, significand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameError;

    fn lanes(base: i32) -> Packed {
        std::array::from_fn(|i| Decimal::new(i as u8 + 1, 2, base * (i as i32 + 1)))
    }

    #[test]
    fn request_layout_matches_wire_offsets() {
        let a = [Decimal::new(3, 2, 12345); 4];
        let b = [Decimal::new(1, 3, -6789); 4];
        let frame = encode_request(Operation::Divide, &a, &b);

        assert_eq!(frame[0], 3);
        for lane in 0..4 {
            let base = 1 + lane * 2 * LANE_SIZE;
            assert_eq!(&frame[base..base + 2], &[3, 2]);
            assert_eq!(&frame[base + 2..base + 6], &12345i32.to_le_bytes());
            assert_eq!(&frame[base + 6..base + 8], &[1, 3]);
            assert_eq!(&frame[base + 8..base + 12], &(-6789i32).to_le_bytes());
        }
        assert_eq!(REQUEST_SIZE, 49);
        assert!(frame[REQUEST_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn lane_offsets_follow_table() {
        let a = lanes(100);
        let b = lanes(-7);
        let frame = encode_request(Operation::Add, &a, &b);

        // a[1] at 13/14/15..=18, b[1] at 19/20/21..=24.
        assert_eq!(frame[13], a[1].integer_places);
        assert_eq!(frame[14], a[1].decimal_places);
        assert_eq!(&frame[15..19], &a[1].significand.to_le_bytes());
        assert_eq!(frame[19], b[1].integer_places);
        assert_eq!(&frame[21..25], &b[1].significand.to_le_bytes());
        // a[3] starts at 37, b[3] ends at 48.
        assert_eq!(frame[37], a[3].integer_places);
        assert_eq!(&frame[45..49], &b[3].significand.to_le_bytes());
    }

    #[test]
    fn decode_response_reads_four_lanes() {
        let mut frame = [0xEEu8; FRAME_SIZE];
        for lane in 0..4 {
            let base = lane * LANE_SIZE;
            frame[base] = 3;
            frame[base + 1] = 3;
            frame[base + 2..base + 6].copy_from_slice(&(130_239 + lane as i32).to_le_bytes());
        }

        let results = decode_response(&frame);
        for (lane, value) in results.iter().enumerate() {
            assert_eq!(*value, Decimal::new(3, 3, 130_239 + lane as i32));
        }
    }

    #[test]
    fn request_decodes_on_device_side() {
        let a = lanes(12345);
        let b = lanes(-1);
        let frame = encode_request(Operation::Multiply, &a, &b);

        let request = decode_request(&frame).unwrap();
        assert_eq!(
            request,
            Request {
                operation: Operation::Multiply,
                a,
                b
            }
        );
    }

    #[test]
    fn unknown_operation_code_is_rejected() {
        let mut frame = encode_request(Operation::Add, &lanes(1), &lanes(2));
        frame[0] = 9;
        assert!(matches!(
            decode_request(&frame),
            Err(FrameError::UnknownOperation(9))
        ));
    }

    #[test]
    fn response_encoding_zero_pads() {
        let results = [Decimal::new(2, 7, 181_838_268); 4];
        let frame = encode_response(&results);
        assert!(frame[RESPONSE_SIZE..].iter().all(|&b| b == 0));
        assert_eq!(decode_response(&frame), results);
    }

    #[test]
    fn extreme_significands_survive() {
        let a = [
            Decimal::new(0, 0, i32::MIN),
            Decimal::new(9, 0, i32::MAX),
            Decimal::new(255, 255, -1),
            Decimal::default(),
        ];
        let frame = encode_request(Operation::Subtract, &a, &a);
        let request = decode_request(&frame).unwrap();
        assert_eq!(request.a, a);
        assert_eq!(request.b, a);
    }
}
