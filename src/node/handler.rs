//! Command handlers and the context they run in.

use crate::protocol::Result;
use crate::protocol::metrics::Metrics;
use crate::transport::{Transport, send_packet};

/// Something that processes the payload of a dispatched frame.
///
/// Implemented for every `FnMut(&[u8], &mut Context<'_>) -> Result<()>`, so
/// closures capturing their own state can be registered directly.
pub trait Handler {
    /// Handle one frame's payload (header and checksum already stripped).
    fn handle(&mut self, payload: &[u8], ctx: &mut Context<'_>) -> Result<()>;
}

impl<F> Handler for F
where
    F: FnMut(&[u8], &mut Context<'_>) -> Result<()>,
{
    fn handle(&mut self, payload: &[u8], ctx: &mut Context<'_>) -> Result<()> {
        self(payload, ctx)
    }
}

/// Capabilities handed to a handler while it runs.
pub struct Context<'a> {
    transport: &'a mut dyn Transport,
    metrics: &'a mut Metrics,
    node_id: u8,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        transport: &'a mut dyn Transport,
        metrics: &'a mut Metrics,
        node_id: u8,
    ) -> Self {
        Self {
            transport,
            metrics,
            node_id,
        }
    }

    /// Identity byte of the node dispatching this frame.
    #[must_use]
    pub const fn node_id(&self) -> u8 {
        self.node_id
    }

    /// Frame and transmit a reply.
    pub fn send(&mut self, identifier: u8, payload: &[u8]) -> Result<()> {
        send_packet(&mut *self.transport, self.metrics, identifier, payload)
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("node_id", &self.node_id)
            .finish_non_exhaustive()
    }
}
