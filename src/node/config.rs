//! Node configuration.

use super::HANDSHAKE_REQUEST;
use crate::protocol::{Error, Result};

/// How many frames a single [`Node::poll`](crate::Node::poll) may dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PollMode {
    /// Return right after the first dispatched frame; later bytes wait for
    /// the next call. Bounds the work done per call to one handler.
    #[default]
    SingleFrame,
    /// Keep reading until the transport runs dry, dispatching every frame.
    Drain,
}

/// Node configuration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeConfig {
    /// Identity byte reported by the handshake.
    pub node_id: u8,
    /// Frames dispatched per poll.
    pub poll_mode: PollMode,
}

impl NodeConfig {
    /// Configuration for `node_id` with the default poll mode.
    #[must_use]
    pub fn with_node_id(node_id: u8) -> Self {
        Self {
            node_id,
            ..Self::default()
        }
    }

    /// Check the configuration can be served.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] for id `0x00`: a confirmation carrying
    /// it would be indistinguishable from an identity request.
    pub fn validate(&self) -> Result<()> {
        if self.node_id == HANDSHAKE_REQUEST {
            return Err(Error::InvalidNodeId { id: self.node_id });
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: 1,
            poll_mode: PollMode::SingleFrame,
        }
    }
}
