//! Serlink - minimal checksummed command framing for serial links
//!
//! A host and a single node exchange short command frames over any byte
//! stream. The node parses the incoming stream one byte at a time, drops
//! anything malformed and hands valid frames to registered handlers. A
//! built-in handshake lets the host discover and confirm the node's identity.
//!
//! # Quick Start
//!
//! ```rust
//! use serlink::{Context, MemoryTransport, Node, NodeConfig, encode};
//!
//! let transport = MemoryTransport::new();
//! let wire = transport.clone();
//! let mut node = Node::new(transport, NodeConfig::with_node_id(1))?;
//!
//! node.register_handler(0x02, |payload: &[u8], ctx: &mut Context<'_>| {
//!     // Acknowledge with the same identifier
//!     ctx.send(0x02, &payload[..1])
//! })?;
//!
//! wire.push_incoming(&encode(0x02, &[0x01, 0x01])?);
//! assert_eq!(node.poll()?, 1);
//! assert_eq!(wire.take_outgoing(), encode(0x02, &[0x01])?.to_vec());
//! # Ok::<(), serlink::Error>(())
//! ```
//!
//! # Wire Format
//!
//! ```text
//! [SYNC 0xAA] [LEN] [ID] [PAYLOAD (LEN - 4 bytes)] [CHECKSUM]
//! ```
//!
//! `LEN` counts the whole frame and lies in `[4, 64]`. `CHECKSUM` is the XOR
//! of every byte before it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod host;
pub mod node;
pub mod protocol;
pub mod transport;

pub use host::{ConnectOutcome, Host};
pub use node::{
    CommandRegistry, Context, Handler, HandshakeQuery, HandshakeReply, Node, NodeConfig, PollMode,
};
pub use protocol::{
    Error, FrameError, HANDSHAKE_ID, MAX_FRAME_LEN, MAX_PAYLOAD_SIZE, MetricsSnapshot, Packet,
    Result, SYNC_BYTE, decode, encode,
};
pub use transport::{MemoryTransport, StreamTransport, Transport};

/// Serlink protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
