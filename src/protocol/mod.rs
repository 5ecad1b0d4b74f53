//! Serlink wire format
//!
//! This module provides the frame layout, the packet type, the streaming
//! parser and the codec used by both ends of the link.

pub(crate) mod codec;
mod error;
mod frame_buffer;
pub(crate) mod metrics;
mod packet;
mod parser;

pub use codec::{checksum, decode, encode};
pub use error::{Error, FrameError, Result};
pub use frame_buffer::FrameBuffer;
pub use metrics::MetricsSnapshot;
pub use packet::Packet;
pub use parser::{FrameParser, ParseState};

/// Sync byte announcing the start of every frame
pub const SYNC_BYTE: u8 = 0xAA;

/// Bytes of framing around the payload (sync + length + identifier + checksum)
pub const FRAME_OVERHEAD: usize = 4;

/// Smallest legal value of the length byte (empty payload)
pub const MIN_FRAME_LEN: usize = FRAME_OVERHEAD;

/// Largest legal value of the length byte
pub const MAX_FRAME_LEN: usize = 64;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_LEN - FRAME_OVERHEAD;

/// Identifier reserved for the built-in handshake handler
pub const HANDSHAKE_ID: u8 = 0xFF;
