//! Byte-stream transports the link runs over.
//!
//! The protocol only needs a handful of primitives from the wire: how many
//! bytes are waiting, read one, write a block, flush it, and whether a write
//! has failed. [`Transport`] captures exactly that; opening and configuring
//! the underlying port stays with the caller.

mod memory;
mod stream;

use tracing::trace;

use crate::protocol::metrics::Metrics;
use crate::protocol::{Error, Result, encode};

pub use memory::MemoryTransport;
pub use stream::{DEFAULT_READ_CHUNK, StreamTransport};

/// Byte-level I/O primitives consumed by [`Node`](crate::Node) and
/// [`Host`](crate::Host).
pub trait Transport {
    /// Number of bytes that can be read without blocking.
    fn available(&mut self) -> usize;

    /// Read one byte, or `None` if nothing is buffered.
    fn read(&mut self) -> Option<u8>;

    /// Queue `bytes` for transmission, returning how many were accepted.
    ///
    /// A short count also latches the write-error flag.
    fn write(&mut self, bytes: &[u8]) -> usize;

    /// Block until every queued byte has been transmitted.
    fn flush(&mut self);

    /// Whether a write or flush has failed since the flag was last cleared.
    fn write_error(&self) -> bool;

    /// Reset the write-error flag.
    fn clear_write_error(&mut self);
}

/// Frame `payload` under `identifier`, write it and flush.
///
/// A short write or a latched write-error flag after the flush is reported
/// as [`Error::WriteFailed`]; nothing is retried.
pub(crate) fn send_packet<T: Transport + ?Sized>(
    transport: &mut T,
    metrics: &mut Metrics,
    identifier: u8,
    payload: &[u8],
) -> Result<()> {
    let frame = encode(identifier, payload)?;
    let written = transport.write(&frame);
    transport.flush();
    if written != frame.len() || transport.write_error() {
        return Err(Error::WriteFailed {
            written,
            expected: frame.len(),
        });
    }

    metrics.record_sent();
    trace!(identifier, len = frame.len(), "frame sent");
    Ok(())
}
