//! In-memory transport for loopback links and tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use super::Transport;

type Queue = Rc<RefCell<VecDeque<u8>>>;

/// Queue-backed [`Transport`].
///
/// Clones share the same queues and flags, so a test can keep one handle to
/// inject bytes and inspect output while another is owned by a
/// [`Node`](crate::Node). [`MemoryTransport::pair`] connects two endpoints
/// back to back.
#[derive(Clone, Debug, Default)]
pub struct MemoryTransport {
    inbound: Queue,
    outbound: Queue,
    write_error: Rc<Cell<bool>>,
    reject_writes: Rc<Cell<bool>>,
}

impl MemoryTransport {
    /// Create a standalone transport with empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create two endpoints where each one's output is the other's input.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let a_to_b = Queue::default();
        let b_to_a = Queue::default();
        let a = Self {
            inbound: Rc::clone(&b_to_a),
            outbound: Rc::clone(&a_to_b),
            ..Self::default()
        };
        let b = Self {
            inbound: a_to_b,
            outbound: b_to_a,
            ..Self::default()
        };
        (a, b)
    }

    /// Append bytes to the inbound queue as if they arrived on the wire.
    pub fn push_incoming(&self, bytes: &[u8]) {
        self.inbound.borrow_mut().extend(bytes);
    }

    /// Drain everything written so far.
    #[must_use]
    pub fn take_outgoing(&self) -> Vec<u8> {
        self.outbound.borrow_mut().drain(..).collect()
    }

    /// Number of inbound bytes not yet read.
    #[must_use]
    pub fn pending_incoming(&self) -> usize {
        self.inbound.borrow().len()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }
}

impl Transport for MemoryTransport {
    fn available(&mut self) -> usize {
        self.inbound.borrow().len()
    }

    fn read(&mut self) -> Option<u8> {
        self.inbound.borrow_mut().pop_front()
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        if self.reject_writes.get() {
            self.write_error.set(true);
            return 0;
        }
        self.outbound.borrow_mut().extend(bytes);
        bytes.len()
    }

    fn flush(&mut self) {}

    fn write_error(&self) -> bool {
        self.write_error.get()
    }

    fn clear_write_error(&mut self) {
        self.write_error.set(false);
    }
}
