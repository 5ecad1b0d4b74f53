//! Streaming frame parser.
//!
//! Bytes arrive one at a time from the transport. The parser tracks how far
//! into a frame it is and validates each header field as soon as it lands, so
//! a bad sync, length or identifier is rejected without waiting for the rest
//! of the frame.

use bytes::Bytes;

use super::codec::checksum;
use super::{FrameBuffer, FrameError, MAX_FRAME_LEN, MIN_FRAME_LEN, Packet, SYNC_BYTE};

/// Position of the parser within the frame being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Waiting for the sync byte
    AwaitSync,
    /// Got sync, waiting for the length byte
    AwaitLength,
    /// Got length, waiting for the identifier byte
    AwaitIdentifier,
    /// Collecting payload bytes and the trailing checksum
    AccumulatePayload,
}

/// Byte-at-a-time frame parser.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: FrameBuffer,
    expected_len: usize,
}

impl FrameParser {
    /// Create a parser waiting for a sync byte.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ParseState::AwaitSync,
            buffer: FrameBuffer::new(),
            expected_len: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ParseState {
        self.state
    }

    /// Number of bytes of the in-flight frame held so far.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any partial frame and wait for the next sync byte.
    pub fn reset(&mut self) {
        self.state = ParseState::AwaitSync;
        self.buffer.reset();
        self.expected_len = 0;
    }

    /// Feed a single byte.
    ///
    /// `is_known` decides whether an identifier byte has a handler; frames
    /// with unknown identifiers are dropped before their payload is read.
    ///
    /// Returns `Ok(Some(packet))` when a frame completes with a valid checksum
    /// and `Ok(None)` when more bytes are needed. On `Err` the parser has
    /// already returned to [`ParseState::AwaitSync`].
    pub fn feed<F>(&mut self, byte: u8, is_known: F) -> Result<Option<Packet>, FrameError>
    where
        F: FnOnce(u8) -> bool,
    {
        match self.state {
            ParseState::AwaitSync => {
                if byte != SYNC_BYTE {
                    return Err(FrameError::Sync { found: byte });
                }
                self.push(byte)?;
                self.state = ParseState::AwaitLength;
                Ok(None)
            }
            ParseState::AwaitLength => {
                let length = usize::from(byte);
                if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&length) {
                    self.reset();
                    return Err(FrameError::Length {
                        length: byte,
                        min: MIN_FRAME_LEN,
                        max: MAX_FRAME_LEN,
                    });
                }
                self.push(byte)?;
                self.expected_len = length;
                self.state = ParseState::AwaitIdentifier;
                Ok(None)
            }
            ParseState::AwaitIdentifier => {
                if !is_known(byte) {
                    self.reset();
                    return Err(FrameError::UnknownIdentifier { identifier: byte });
                }
                self.push(byte)?;
                self.state = ParseState::AccumulatePayload;
                Ok(None)
            }
            ParseState::AccumulatePayload => {
                self.push(byte)?;
                if self.buffer.len() < self.expected_len {
                    return Ok(None);
                }
                let result = self.finish();
                self.reset();
                result.map(Some)
            }
        }
    }

    fn push(&mut self, byte: u8) -> Result<(), FrameError> {
        self.buffer.push(byte).inspect_err(|_| self.reset())
    }

    fn finish(&self) -> Result<Packet, FrameError> {
        let frame = self.buffer.as_slice();
        let checksum_offset = frame.len() - 1;
        let expected = checksum(&frame[..checksum_offset]);
        let found = frame[checksum_offset];
        if expected != found {
            return Err(FrameError::ChecksumMismatch { expected, found });
        }

        let payload = Bytes::copy_from_slice(&frame[3..checksum_offset]);
        Ok(Packet::from_parts(frame[2], payload))
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{HANDSHAKE_ID, encode};

    fn any_id(_: u8) -> bool {
        true
    }

    fn feed_all(parser: &mut FrameParser, bytes: &[u8]) -> Vec<Result<Option<Packet>, FrameError>> {
        bytes.iter().map(|&b| parser.feed(b, any_id)).collect()
    }

    #[test]
    fn test_parse_handshake_request() {
        let mut parser = FrameParser::new();
        let results = feed_all(&mut parser, &[0xAA, 0x05, 0xFF, 0x00, 0x50]);

        assert!(results[..4].iter().all(|r| matches!(r, Ok(None))));
        let packet = results[4].clone().unwrap().unwrap();
        assert_eq!(packet.identifier(), HANDSHAKE_ID);
        assert_eq!(packet.payload().as_ref(), &[0x00]);
        assert_eq!(parser.state(), ParseState::AwaitSync);
        assert_eq!(parser.in_flight(), 0);
    }

    #[test]
    fn test_state_progression() {
        let mut parser = FrameParser::new();
        assert_eq!(parser.state(), ParseState::AwaitSync);
        parser.feed(SYNC_BYTE, any_id).unwrap();
        assert_eq!(parser.state(), ParseState::AwaitLength);
        parser.feed(0x06, any_id).unwrap();
        assert_eq!(parser.state(), ParseState::AwaitIdentifier);
        parser.feed(0x02, any_id).unwrap();
        assert_eq!(parser.state(), ParseState::AccumulatePayload);
        assert_eq!(parser.in_flight(), 3);
    }

    #[test]
    fn test_garbage_consumed_one_byte_at_a_time() {
        let mut parser = FrameParser::new();
        for byte in [0x00, 0x12, 0x55] {
            assert_eq!(parser.feed(byte, any_id), Err(FrameError::Sync { found: byte }));
            assert_eq!(parser.state(), ParseState::AwaitSync);
        }
    }

    #[test]
    fn test_empty_payload_frame() {
        let frame = encode(0x24, &[]).unwrap();
        let mut parser = FrameParser::new();
        let results = feed_all(&mut parser, &frame);

        let packet = results.last().cloned().unwrap().unwrap().unwrap();
        assert_eq!(packet.identifier(), 0x24);
        assert!(packet.payload().is_empty());
    }

    #[test]
    fn test_unknown_identifier_rejected() {
        let mut parser = FrameParser::new();
        parser.feed(SYNC_BYTE, |_| false).unwrap();
        parser.feed(0x05, |_| false).unwrap();

        assert_eq!(
            parser.feed(0x07, |id| id == 0x01),
            Err(FrameError::UnknownIdentifier { identifier: 0x07 })
        );
        assert_eq!(parser.state(), ParseState::AwaitSync);
    }

    #[test]
    fn test_checksum_mismatch_discards_frame() {
        let mut frame = encode(0x01, b"xyz").unwrap().to_vec();
        let last = frame.len() - 1;
        frame[last] ^= 0x01;

        let mut parser = FrameParser::new();
        let results = feed_all(&mut parser, &frame);

        assert!(matches!(
            results.last(),
            Some(Err(FrameError::ChecksumMismatch { .. }))
        ));
        assert_eq!(parser.state(), ParseState::AwaitSync);
        assert_eq!(parser.in_flight(), 0);
    }

    #[test]
    fn test_resync_after_garbage() {
        let frame = encode(0x24, &[0x01]).unwrap();
        let mut data = vec![0x00, 0xFF, 0x12, 0x34];
        data.extend_from_slice(&frame);

        let mut parser = FrameParser::new();
        let packets: Vec<Packet> = feed_all(&mut parser, &data)
            .into_iter()
            .filter_map(|r| r.ok().flatten())
            .collect();

        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].identifier(), 0x24);
    }

    #[test]
    fn test_frame_split_across_feeds() {
        let frame = encode(0x03, b"split").unwrap();
        let mut parser = FrameParser::new();

        let (head, tail) = frame.split_at(4);
        assert!(feed_all(&mut parser, head).iter().all(|r| matches!(r, Ok(None))));
        let results = feed_all(&mut parser, tail);
        let packet = results.last().cloned().unwrap().unwrap().unwrap();
        assert_eq!(packet.payload().as_ref(), b"split");
    }

    #[test]
    fn test_length_bit_flip_shortens_frame() {
        // Valid frame [AA 06 02 AC 01 03] with LEN bit 1 flipped: the shorter
        // frame ends on 0xAC, which is the XOR of [AA 04 02]
        let mut parser = FrameParser::new();
        let results = feed_all(&mut parser, &[0xAA, 0x04, 0x02, 0xAC, 0x01, 0x03]);

        let packet = results[3].clone().unwrap().unwrap();
        assert_eq!(packet.identifier(), 0x02);
        assert!(packet.payload().is_empty());
        // The stranded tail is scanned as noise
        assert_eq!(results[4], Err(FrameError::Sync { found: 0x01 }));
        assert_eq!(results[5], Err(FrameError::Sync { found: 0x03 }));
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn bad_length() -> impl Strategy<Value = u8> {
            prop_oneof![0u8..4, 65u8..=255]
        }

        proptest! {
            /// Property: a bad length byte is rejected before the identifier is read
            #[test]
            fn prop_bad_length_discarded_before_identifier(
                length in bad_length(),
                identifier in any::<u8>().prop_filter("not sync", |b| *b != SYNC_BYTE),
            ) {
                let mut parser = FrameParser::new();
                let mut consulted = false;

                prop_assert_eq!(parser.feed(SYNC_BYTE, any_id), Ok(None));
                let rejected = parser.feed(length, any_id);
                let is_length_error = matches!(rejected, Err(FrameError::Length { .. }));
                prop_assert!(is_length_error);
                prop_assert_eq!(parser.state(), ParseState::AwaitSync);

                // The byte after the bad length is a fresh sync candidate
                let next = parser.feed(identifier, |_| { consulted = true; true });
                prop_assert_eq!(next, Err(FrameError::Sync { found: identifier }));
                prop_assert!(!consulted);
            }

            /// Property: legal frames always parse, whatever garbage precedes them
            #[test]
            fn prop_frame_after_garbage_parses(
                garbage in prop::collection::vec(
                    any::<u8>().prop_filter("not sync", |b| *b != SYNC_BYTE), 0..32),
                identifier in any::<u8>(),
                payload in prop::collection::vec(any::<u8>(), 0..=60),
            ) {
                let frame = encode(identifier, &payload).unwrap();
                let mut data = garbage;
                data.extend_from_slice(&frame);

                let mut parser = FrameParser::new();
                let packets: Vec<Packet> = feed_all(&mut parser, &data)
                    .into_iter()
                    .filter_map(|r| r.ok().flatten())
                    .collect();

                prop_assert_eq!(packets.len(), 1);
                prop_assert_eq!(packets[0].identifier(), identifier);
                prop_assert_eq!(packets[0].payload().as_ref(), payload.as_slice());
            }
        }
    }
}
