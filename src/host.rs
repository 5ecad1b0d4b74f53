//! Controller side of the link.
//!
//! A [`Host`] sends commands to a node and reads back whatever it transmits.
//! It also drives the identity handshake: ask the node who it is, check the
//! answer, then confirm.

use tracing::{debug, instrument};

use crate::node::{HandshakeQuery, HandshakeReply};
use crate::protocol::metrics::Metrics;
use crate::protocol::{FrameParser, HANDSHAKE_ID, MetricsSnapshot, Packet, Result};
use crate::transport::{Transport, send_packet};

/// Result of [`Host::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Node reported the expected identity and accepted the confirmation
    Connected,
    /// Node reported a different identity; no confirmation was sent
    IdMismatch {
        /// Identity the node reported
        found: u8,
    },
    /// Node rejected the confirmation
    Rejected,
    /// No handshake reply arrived
    NoReply,
}

/// Host endpoint talking to one node.
#[derive(Debug)]
pub struct Host<T> {
    transport: T,
    parser: FrameParser,
    metrics: Metrics,
    pending: Option<HandshakeQuery>,
}

impl<T: Transport> Host<T> {
    /// Create a host over `transport`.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            parser: FrameParser::new(),
            metrics: Metrics::default(),
            pending: None,
        }
    }

    /// Frame and transmit a packet.
    pub fn send(&mut self, identifier: u8, payload: &[u8]) -> Result<()> {
        send_packet(&mut self.transport, &mut self.metrics, identifier, payload)
    }

    /// Read buffered input until one complete packet is decoded.
    ///
    /// Every identifier is accepted. Returns `None` once the transport has no
    /// more bytes; a partial frame is kept for the next call.
    pub fn recv(&mut self) -> Option<Packet> {
        while self.transport.available() > 0 {
            let byte = self.transport.read()?;
            self.metrics.record_byte();
            match self.parser.feed(byte, |_| true) {
                Ok(None) => {}
                Ok(Some(packet)) => {
                    self.metrics.record_dispatch();
                    return Some(packet);
                }
                Err(error) => {
                    debug!(%error, "frame rejected");
                    self.metrics.record_reject(&error);
                }
            }
        }
        None
    }

    /// Ask the node for its identity byte.
    pub fn request_identity(&mut self) -> Result<()> {
        self.query(HandshakeQuery::Request)
    }

    /// Ask the node to confirm it holds `node_id`.
    pub fn confirm_identity(&mut self, node_id: u8) -> Result<()> {
        self.query(HandshakeQuery::Confirm(node_id))
    }

    fn query(&mut self, query: HandshakeQuery) -> Result<()> {
        self.send(HANDSHAKE_ID, &[query.payload()])?;
        self.pending = Some(query);
        Ok(())
    }

    /// Query still waiting for its reply.
    #[must_use]
    pub const fn pending_query(&self) -> Option<HandshakeQuery> {
        self.pending
    }

    /// Read input until a reply to the pending handshake query arrives.
    ///
    /// Non-handshake packets and unsolicited replies read along the way are
    /// discarded.
    pub fn handshake_reply(&mut self) -> Option<HandshakeReply> {
        while let Some(packet) = self.recv() {
            if packet.identifier() != HANDSHAKE_ID {
                debug!(identifier = packet.identifier(), "discarding non-handshake packet");
                continue;
            }
            let Some(query) = self.pending else {
                debug!("discarding unsolicited handshake reply");
                continue;
            };
            if let Some(reply) = query.interpret(packet.payload()) {
                self.pending = None;
                return Some(reply);
            }
        }
        None
    }

    /// Run the full handshake against a node expected to hold `node_id`.
    ///
    /// `pump` is called after each query is sent and must give the node time
    /// to answer: poll it directly on a loopback link, or wait for the line
    /// on a real port.
    #[instrument(level = "debug", skip(self, pump))]
    pub fn connect<F>(&mut self, node_id: u8, mut pump: F) -> Result<ConnectOutcome>
    where
        F: FnMut() -> Result<()>,
    {
        self.request_identity()?;
        pump()?;
        match self.handshake_reply() {
            Some(HandshakeReply::Identity(found)) if found == node_id => {}
            Some(HandshakeReply::Identity(found)) => {
                debug!(found, "node identity mismatch");
                return Ok(ConnectOutcome::IdMismatch { found });
            }
            _ => return Ok(ConnectOutcome::NoReply),
        }

        self.confirm_identity(node_id)?;
        pump()?;
        let outcome = match self.handshake_reply() {
            Some(HandshakeReply::Confirmed) => ConnectOutcome::Connected,
            Some(HandshakeReply::Rejected) => ConnectOutcome::Rejected,
            _ => ConnectOutcome::NoReply,
        };
        debug!(?outcome, "handshake finished");
        Ok(outcome)
    }

    /// Snapshot of traffic and rejection counters.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.totals()
    }

    /// Access the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Tear down the host and return its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
