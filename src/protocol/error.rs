//! Serlink error types

use thiserror::Error;

/// Reasons a frame is rejected while scanning the byte stream.
///
/// Inside [`Node::poll`](crate::Node::poll) these never reach the caller: the
/// offending bytes are dropped, the rejection is counted and scanning resumes
/// at the next byte.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Leading byte was not the sync marker
    #[error("unexpected leading byte: expected 0xaa, got {found:#04x}")]
    Sync {
        /// Byte found where the sync marker was expected
        found: u8,
    },

    /// Length byte outside the legal range
    #[error("frame length {length} outside [{min}, {max}]")]
    Length {
        /// Length byte as received
        length: u8,
        /// Smallest legal length
        min: usize,
        /// Largest legal length
        max: usize,
    },

    /// No handler is registered for the identifier
    #[error("no handler registered for identifier {identifier:#04x}")]
    UnknownIdentifier {
        /// Identifier byte as received
        identifier: u8,
    },

    /// Checksum mismatch
    #[error("checksum mismatch: expected {expected:#04x}, got {found:#04x}")]
    ChecksumMismatch {
        /// Checksum computed over the received bytes
        expected: u8,
        /// Checksum byte carried by the frame
        found: u8,
    },

    /// Frame did not fit the bounded receive buffer
    #[error("frame overran the {capacity}-byte receive buffer")]
    Overflow {
        /// Buffer capacity
        capacity: usize,
    },

    /// Slice ended before the frame was complete
    #[error("truncated frame: need {needed} bytes, got {got}")]
    Truncated {
        /// Bytes needed for the whole frame
        needed: usize,
        /// Bytes available
        got: usize,
    },
}

/// Serlink errors
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed frame
    #[error("frame rejected: {0}")]
    Frame(#[from] FrameError),

    /// Payload too large to frame
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Attempt to rebind a reserved identifier
    #[error("identifier {identifier:#04x} is reserved")]
    ReservedIdentifier {
        /// Identifier that was refused
        identifier: u8,
    },

    /// Node identity that cannot be addressed by the handshake
    #[error("node id {id:#04x} collides with the handshake request sentinel")]
    InvalidNodeId {
        /// Refused id
        id: u8,
    },

    /// Transport accepted fewer bytes than the frame holds, or flagged a write error
    #[error("write failed: {written} of {expected} bytes accepted")]
    WriteFailed {
        /// Bytes accepted by the transport
        written: usize,
        /// Bytes in the frame
        expected: usize,
    },

    /// Transport write-error flag is latched; clear it before polling again
    #[error("transport write-error flag is set")]
    WriteFault,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
