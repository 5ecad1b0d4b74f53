//! Node side of the link: owns the transport, parses incoming frames and
//! dispatches them to registered handlers.

mod config;
mod handler;
mod handshake;
mod registry;

pub use config::{NodeConfig, PollMode};
pub use handler::{Context, Handler};
pub use handshake::{
    HANDSHAKE_ERROR, HANDSHAKE_OK, HANDSHAKE_REQUEST, Handshake, HandshakeQuery, HandshakeReply,
    reply_for,
};
pub use registry::CommandRegistry;

use tracing::{debug, instrument, trace, warn};

use crate::protocol::metrics::Metrics;
use crate::protocol::{
    Error, FrameError, FrameParser, MetricsSnapshot, Packet, ParseState, Result,
};
use crate::transport::{Transport, send_packet};

/// An addressable node serving commands over a [`Transport`].
///
/// Construct one per link and hand it to whatever loop calls [`Node::poll`].
#[derive(Debug)]
pub struct Node<T> {
    transport: T,
    registry: CommandRegistry,
    parser: FrameParser,
    config: NodeConfig,
    metrics: Metrics,
}

impl<T: Transport> Node<T> {
    /// Create a node with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if the configuration is rejected by
    /// [`NodeConfig::validate`].
    pub fn new(transport: T, config: NodeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            registry: CommandRegistry::new(),
            parser: FrameParser::new(),
            config,
            metrics: Metrics::default(),
        })
    }

    /// Identity byte answered by the handshake.
    #[must_use]
    pub const fn node_id(&self) -> u8 {
        self.config.node_id
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Bind a handler to `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedIdentifier`] for the handshake identifier.
    pub fn register_handler<H>(&mut self, identifier: u8, handler: H) -> Result<()>
    where
        H: Handler + 'static,
    {
        self.registry.register(identifier, handler)
    }

    /// Frame and transmit a packet, blocking until the transport has flushed.
    #[instrument(level = "trace", skip(self, payload), fields(len = payload.len()))]
    pub fn send(&mut self, identifier: u8, payload: &[u8]) -> Result<()> {
        send_packet(&mut self.transport, &mut self.metrics, identifier, payload)
    }

    /// Consume buffered input and dispatch complete frames.
    ///
    /// Returns the number of frames dispatched. In [`PollMode::SingleFrame`]
    /// that is at most one, and any bytes after it stay in the transport.
    /// Malformed input is dropped and counted, never reported.
    ///
    /// # Errors
    ///
    /// - [`Error::WriteFault`] while the transport's write-error flag is set;
    ///   no input is consumed until it is cleared. If a handler trips the flag
    ///   mid-drain, the frames dispatched so far are returned as `Ok` and the
    ///   next call reports the fault.
    /// - Any error returned by a handler.
    #[instrument(level = "trace", skip(self))]
    pub fn poll(&mut self) -> Result<usize> {
        let mut dispatched = 0;

        loop {
            if self.transport.write_error() {
                warn!("transport write-error flag set; leaving input unread");
                // Frames already handled this call are reported; the fault
                // surfaces on the next poll
                if dispatched > 0 {
                    break;
                }
                return Err(Error::WriteFault);
            }
            if self.transport.available() == 0 {
                break;
            }
            let Some(byte) = self.transport.read() else {
                break;
            };
            self.metrics.record_byte();

            let registry = &self.registry;
            match self.parser.feed(byte, |identifier| registry.contains(identifier)) {
                Ok(None) => {}
                Ok(Some(packet)) => {
                    self.dispatch(&packet)?;
                    dispatched += 1;
                    if self.config.poll_mode == PollMode::SingleFrame {
                        break;
                    }
                }
                Err(error) => {
                    debug!(%error, "frame rejected");
                    self.metrics.record_reject(&error);
                }
            }
        }

        Ok(dispatched)
    }

    fn dispatch(&mut self, packet: &Packet) -> Result<()> {
        let identifier = packet.identifier();
        let handler = self
            .registry
            .resolve(identifier)
            .ok_or(FrameError::UnknownIdentifier { identifier })?;

        self.metrics.record_dispatch();
        trace!(identifier, len = packet.payload().len(), "dispatching frame");

        let mut ctx = Context::new(&mut self.transport, &mut self.metrics, self.config.node_id);
        handler.handle(packet.payload(), &mut ctx)
    }

    /// Snapshot of traffic and rejection counters.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.totals()
    }

    /// Where the parser is within the in-flight frame.
    #[must_use]
    pub const fn parse_state(&self) -> ParseState {
        self.parser.state()
    }

    /// Access the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport, e.g. to clear its write-error flag.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Tear down the node and return its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
