//! Serlink packet implementation

use bytes::Bytes;

use super::{Error, MAX_PAYLOAD_SIZE, Result};

/// A decoded command: identifier plus payload, without framing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    identifier: u8,
    payload: Bytes,
}

impl Packet {
    /// Create a new packet
    pub fn new(identifier: u8, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self {
            identifier,
            payload,
        })
    }

    /// Create a packet with no payload
    #[must_use]
    pub const fn empty(identifier: u8) -> Self {
        Self {
            identifier,
            payload: Bytes::new(),
        }
    }

    /// Build from parts already checked by the parser
    pub(crate) fn from_parts(identifier: u8, payload: Bytes) -> Self {
        debug_assert!(payload.len() <= MAX_PAYLOAD_SIZE);
        Self {
            identifier,
            payload,
        }
    }

    /// Get identifier
    #[must_use]
    pub const fn identifier(&self) -> u8 {
        self.identifier
    }

    /// Get payload
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Length byte this packet carries on the wire
    #[must_use]
    pub fn frame_len(&self) -> usize {
        super::FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode packet to a framed byte sequence
    #[must_use]
    pub fn encode(&self) -> Bytes {
        super::codec::encode_unchecked(self.identifier, &self.payload)
    }

    /// Decode packet from a framed byte sequence
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        super::decode(bytes)
    }
}
