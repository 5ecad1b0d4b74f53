//! Bounded receive buffer for the in-flight frame.

use heapless::Vec;

use super::{FrameError, MAX_FRAME_LEN};

/// Fixed-capacity byte buffer holding one frame under construction.
///
/// Pushing past capacity is reported as [`FrameError::Overflow`] instead of
/// silently wrapping or resetting.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    data: Vec<u8, MAX_FRAME_LEN>,
}

impl FrameBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Append one byte.
    pub fn push(&mut self, byte: u8) -> Result<(), FrameError> {
        self.data.push(byte).map_err(|_| FrameError::Overflow {
            capacity: MAX_FRAME_LEN,
        })
    }

    /// Drop the buffered bytes.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Expose the filled portion of the buffer as an immutable slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Current logical length of the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the buffer contains no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }
}
