//! Registry mapping identifier bytes to handlers.

use std::collections::HashMap;

use super::{Handler, Handshake};
use crate::protocol::{Error, HANDSHAKE_ID, Result};

/// Identifier-to-handler dispatch table.
///
/// The handshake identifier is bound to [`Handshake`] at construction and
/// cannot be rebound. Every other identifier follows last-write-wins.
pub struct CommandRegistry {
    handlers: HashMap<u8, Box<dyn Handler>>,
}

impl CommandRegistry {
    /// Create a registry holding only the handshake handler.
    #[must_use]
    pub fn new() -> Self {
        let mut handlers: HashMap<u8, Box<dyn Handler>> = HashMap::new();
        handlers.insert(HANDSHAKE_ID, Box::new(Handshake));
        Self { handlers }
    }

    /// Bind `handler` to `identifier`, replacing any previous binding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedIdentifier`] for the handshake identifier.
    pub fn register<H>(&mut self, identifier: u8, handler: H) -> Result<()>
    where
        H: Handler + 'static,
    {
        if identifier == HANDSHAKE_ID {
            return Err(Error::ReservedIdentifier { identifier });
        }
        self.handlers.insert(identifier, Box::new(handler));
        Ok(())
    }

    /// Look up the handler bound to `identifier`.
    pub fn resolve(&mut self, identifier: u8) -> Option<&mut (dyn Handler + 'static)> {
        self.handlers
            .get_mut(&identifier)
            .map(|handler| &mut **handler)
    }

    /// Whether `identifier` has a handler.
    #[must_use]
    pub fn contains(&self, identifier: u8) -> bool {
        self.handlers.contains_key(&identifier)
    }

    /// Number of bound identifiers, handshake included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Always false: the handshake entry is permanent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut identifiers: Vec<u8> = self.handlers.keys().copied().collect();
        identifiers.sort_unstable();
        f.debug_struct("CommandRegistry")
            .field("identifiers", &identifiers)
            .finish()
    }
}
