//! Built-in identity handshake.
//!
//! The host discovers a node's identity byte with a request and then confirms
//! it by echoing the byte back. Both directions use [`HANDSHAKE_ID`] as the
//! frame identifier and a single payload byte.
//!
//! ```text
//! host -> node   [0x00]          request
//! node -> host   [node_id]
//! host -> node   [node_id]       confirmation
//! node -> host   [0xAA] | [0xFF] ok | error
//! ```
//!
//! The payload sentinels live in payload-value space: `0xFF` as an error
//! reply is unrelated to `0xFF` as the handshake identifier.

use tracing::debug;

use super::{Context, Handler};
use crate::protocol::{HANDSHAKE_ID, Result};

/// Payload byte asking the node for its identity
pub const HANDSHAKE_REQUEST: u8 = 0x00;

/// Reply byte confirming the identity matched
pub const HANDSHAKE_OK: u8 = 0xAA;

/// Reply byte rejecting a confirmation (or an empty query)
pub const HANDSHAKE_ERROR: u8 = 0xFF;

/// Reply byte a node with identity `node_id` sends for a query payload.
#[must_use]
pub fn reply_for(node_id: u8, payload: &[u8]) -> u8 {
    match payload.first() {
        Some(&HANDSHAKE_REQUEST) => node_id,
        Some(&candidate) if candidate == node_id => HANDSHAKE_OK,
        _ => HANDSHAKE_ERROR,
    }
}

/// Node-side handshake handler, bound to [`HANDSHAKE_ID`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Handshake;

impl Handler for Handshake {
    fn handle(&mut self, payload: &[u8], ctx: &mut Context<'_>) -> Result<()> {
        let reply = reply_for(ctx.node_id(), payload);
        debug!(query = ?payload.first(), reply, "answering handshake");
        ctx.send(HANDSHAKE_ID, &[reply])
    }
}

/// Host-side query awaiting a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeQuery {
    /// Ask for the node's identity
    Request,
    /// Confirm the node holds this identity
    Confirm(u8),
}

impl HandshakeQuery {
    /// Payload byte carried by this query.
    #[must_use]
    pub const fn payload(self) -> u8 {
        match self {
            Self::Request => HANDSHAKE_REQUEST,
            Self::Confirm(node_id) => node_id,
        }
    }

    /// Interpret a reply payload in light of this query.
    ///
    /// Returns `None` for an empty payload.
    #[must_use]
    pub fn interpret(self, payload: &[u8]) -> Option<HandshakeReply> {
        let &byte = payload.first()?;
        Some(match self {
            Self::Request => HandshakeReply::Identity(byte),
            Self::Confirm(_) if byte == HANDSHAKE_OK => HandshakeReply::Confirmed,
            Self::Confirm(_) => HandshakeReply::Rejected,
        })
    }
}

/// Decoded handshake reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeReply {
    /// Node reported its identity byte
    Identity(u8),
    /// Node accepted the confirmation
    Confirmed,
    /// Node rejected the confirmation
    Rejected,
}
