//! Serlink frame codec (encode/decode)
//!
//! `encode` is the packet builder used by every send path. `decode` parses a
//! single frame held in a slice; streaming input goes through
//! [`FrameParser`](super::FrameParser) instead.

use bytes::{BufMut, Bytes, BytesMut};

use super::{
    Error, FRAME_OVERHEAD, FrameError, MAX_FRAME_LEN, MAX_PAYLOAD_SIZE, MIN_FRAME_LEN, Packet,
    Result, SYNC_BYTE,
};

/// XOR of every byte in `bytes`
///
/// Detects any corruption that flips an odd number of bits in total, provided
/// the length byte arrives intact. A damaged length byte moves the frame
/// boundary, so a different byte is checked as the checksum and the shortened
/// frame can still verify. Flips that cancel out (an even count in the same
/// bit position) also pass unnoticed.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, byte| acc ^ byte)
}

/// Encode an identifier and payload into a frame
///
/// # Format
///
/// ```text
/// [SYNC 0xAA] [LEN] [ID] [PAYLOAD (LEN - 4 bytes)] [CHECKSUM]
/// ```
///
/// # Errors
///
/// Returns [`Error::PayloadTooLarge`] if the payload exceeds 60 bytes.
pub fn encode(identifier: u8, payload: &[u8]) -> Result<Bytes> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(Error::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }

    Ok(encode_unchecked(identifier, payload))
}

pub(crate) fn encode_unchecked(identifier: u8, payload: &[u8]) -> Bytes {
    let frame_len = FRAME_OVERHEAD + payload.len();
    let mut frame = BytesMut::with_capacity(frame_len);

    frame.put_u8(SYNC_BYTE);
    // Bounded by MAX_FRAME_LEN, always fits a byte
    #[allow(clippy::cast_possible_truncation)]
    let length = frame_len as u8;
    frame.put_u8(length);
    frame.put_u8(identifier);
    frame.put_slice(payload);

    let sum = checksum(&frame);
    frame.put_u8(sum);

    frame.freeze()
}

/// Decode one frame from the start of `bytes`
///
/// Any identifier is accepted. Bytes past the end of the frame are ignored.
///
/// # Errors
///
/// Returns [`Error::Frame`] if:
/// - The first byte is not the sync marker
/// - The length byte is outside `[4, 64]`
/// - The slice is shorter than the length byte announces
/// - The checksum doesn't match
pub fn decode(bytes: &[u8]) -> Result<Packet> {
    let Some(&sync) = bytes.first() else {
        return Err(FrameError::Truncated { needed: 1, got: 0 }.into());
    };
    if sync != SYNC_BYTE {
        return Err(FrameError::Sync { found: sync }.into());
    }

    let Some(&length) = bytes.get(1) else {
        return Err(FrameError::Truncated {
            needed: MIN_FRAME_LEN,
            got: bytes.len(),
        }
        .into());
    };
    let frame_len = usize::from(length);
    if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&frame_len) {
        return Err(FrameError::Length {
            length,
            min: MIN_FRAME_LEN,
            max: MAX_FRAME_LEN,
        }
        .into());
    }

    if bytes.len() < frame_len {
        return Err(FrameError::Truncated {
            needed: frame_len,
            got: bytes.len(),
        }
        .into());
    }

    let checksum_offset = frame_len - 1;
    let expected = checksum(&bytes[..checksum_offset]);
    let found = bytes[checksum_offset];
    if expected != found {
        return Err(FrameError::ChecksumMismatch { expected, found }.into());
    }

    let payload = Bytes::copy_from_slice(&bytes[3..checksum_offset]);
    Ok(Packet::from_parts(bytes[2], payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HANDSHAKE_ID;

    #[test]
    fn test_encode_handshake_request() {
        let frame = encode(HANDSHAKE_ID, &[0x00]).unwrap();
        assert_eq!(frame.as_ref(), &[0xAA, 0x05, 0xFF, 0x00, 0x50]);
    }

    #[test]
    fn test_encode_empty_payload() {
        let frame = encode(0x20, &[]).unwrap();
        // 0xAA ^ 0x04 ^ 0x20
        assert_eq!(frame.as_ref(), &[0xAA, 0x04, 0x20, 0x8E]);
    }

    #[test]
    fn test_encode_lock_axis_command() {
        // Sync + length + identifier + axis + lock state + checksum
        let frame = encode(0x02, &[0x01, 0x01]).unwrap();
        let expected_sum = 0xAA ^ 0x06 ^ 0x02 ^ 0x01 ^ 0x01;
        assert_eq!(frame.as_ref(), &[0xAA, 0x06, 0x02, 0x01, 0x01, expected_sum]);
    }

    #[test]
    fn test_encode_payload_too_large() {
        let result = encode(0x01, &[0u8; MAX_PAYLOAD_SIZE + 1]);
        assert!(matches!(result, Err(Error::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_decode_roundtrip() {
        let frame = encode(0x42, b"test payload").unwrap();
        let packet = decode(&frame).unwrap();

        assert_eq!(packet.identifier(), 0x42);
        assert_eq!(packet.payload().as_ref(), b"test payload");
    }

    #[test]
    fn test_decode_invalid_sync() {
        let result = decode(&[0x55, 0x04, 0x20, 0x71]);
        assert!(matches!(
            result,
            Err(Error::Frame(FrameError::Sync { found: 0x55 }))
        ));
    }

    #[test]
    fn test_decode_length_out_of_range() {
        for length in [0u8, 3, 65, 0xFF] {
            let result = decode(&[SYNC_BYTE, length, 0x01, 0x00]);
            assert!(
                matches!(result, Err(Error::Frame(FrameError::Length { .. }))),
                "length {length} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        let mut frame = encode(0x01, b"abc").unwrap().to_vec();
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;

        let result = decode(&frame);
        assert!(matches!(
            result,
            Err(Error::Frame(FrameError::ChecksumMismatch { .. }))
        ));
    }

    #[test]
    fn test_decode_truncated() {
        let frame = encode(0x01, b"abcdef").unwrap();
        let result = decode(&frame[..5]);
        assert!(matches!(
            result,
            Err(Error::Frame(FrameError::Truncated { needed: 10, got: 5 }))
        ));
    }

    #[test]
    fn test_even_weight_corruption_can_pass() {
        // Same bit flipped in two payload bytes cancels out in the XOR
        let mut frame = encode(0x01, &[0x10, 0x20]).unwrap().to_vec();
        frame[3] ^= 0x01;
        frame[4] ^= 0x01;

        let packet = decode(&frame).unwrap();
        assert_eq!(packet.payload().as_ref(), &[0x11, 0x21]);
    }

    #[test]
    fn test_length_bit_flip_can_pass() {
        // 0x06 -> 0x04 makes the first payload byte the checksum, which happens
        // to equal the XOR of the shortened frame
        let mut frame = encode(0x02, &[0xAC, 0x01]).unwrap().to_vec();
        assert_eq!(frame, [0xAA, 0x06, 0x02, 0xAC, 0x01, 0x03]);
        frame[1] ^= 0x02;

        let packet = decode(&frame).unwrap();
        assert_eq!(packet.identifier(), 0x02);
        assert!(packet.payload().is_empty());
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
            prop::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE)
        }

        proptest! {
            /// Property: any legal packet roundtrips
            #[test]
            fn prop_roundtrip_preserves_data(
                identifier in any::<u8>(),
                payload in payload_strategy(),
            ) {
                let frame = encode(identifier, &payload).unwrap();
                let decoded = decode(&frame).unwrap();

                prop_assert_eq!(decoded.identifier(), identifier);
                prop_assert_eq!(decoded.payload().as_ref(), payload.as_slice());
            }

            /// Property: frame length always matches the length byte
            #[test]
            fn prop_length_byte_matches_frame(
                identifier in any::<u8>(),
                payload in payload_strategy(),
            ) {
                let frame = encode(identifier, &payload).unwrap();

                prop_assert_eq!(frame.len(), usize::from(frame[1]));
                prop_assert_eq!(frame.len(), payload.len() + FRAME_OVERHEAD);
                prop_assert_eq!(checksum(&frame), 0);
            }

            /// Property: a single bit flip after the length byte is detected
            #[test]
            fn prop_single_bit_flip_detected(
                identifier in any::<u8>(),
                payload in payload_strategy(),
                position in any::<prop::sample::Index>(),
                bit in 0u8..8,
            ) {
                let mut frame = encode(identifier, &payload).unwrap().to_vec();

                // Identifier, payload and checksum span [2, len)
                let offset = 2 + position.index(frame.len() - 2);
                frame[offset] ^= 1 << bit;

                let result = decode(&frame);
                let is_mismatch =
                    matches!(result, Err(Error::Frame(FrameError::ChecksumMismatch { .. })));
                prop_assert!(is_mismatch, "bit flip at offset {} went undetected", offset);
            }

            /// Property: a single bit flip in the sync byte is always rejected
            #[test]
            fn prop_sync_bit_flip_rejected(
                identifier in any::<u8>(),
                payload in payload_strategy(),
                bit in 0u8..8,
            ) {
                let mut frame = encode(identifier, &payload).unwrap().to_vec();
                frame[0] ^= 1 << bit;

                let result = decode(&frame);
                let is_sync_error = matches!(
                    result,
                    Err(Error::Frame(FrameError::Sync { found })) if found == SYNC_BYTE ^ (1 << bit)
                );
                prop_assert!(is_sync_error);
            }

            /// Property: any non-sync leading byte is rejected
            #[test]
            fn prop_invalid_sync_rejected(
                sync in any::<u8>().prop_filter("not sync", |b| *b != SYNC_BYTE),
                payload in payload_strategy(),
            ) {
                let mut frame = encode(0x01, &payload).unwrap().to_vec();
                frame[0] = sync;

                let result = decode(&frame);
                let is_sync_error = matches!(result, Err(Error::Frame(FrameError::Sync { .. })));
                prop_assert!(is_sync_error);
            }

            /// Property: oversized payloads never produce a frame
            #[test]
            fn prop_oversized_payload_rejected(
                extra in 1usize..64,
            ) {
                let payload = vec![0u8; MAX_PAYLOAD_SIZE + extra];
                prop_assert!(encode(0x01, &payload).is_err());
            }
        }
    }
}
