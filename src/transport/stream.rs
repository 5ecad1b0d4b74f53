//! Adapter from blocking std I/O streams to [`Transport`].

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use tracing::warn;

use super::Transport;
use crate::protocol::MAX_FRAME_LEN;

/// Default number of bytes pulled from the stream per refill.
pub const DEFAULT_READ_CHUNK: usize = MAX_FRAME_LEN;

/// [`Transport`] over any `Read + Write` stream such as a serial port handle.
///
/// Reads are buffered: `available` refills from the stream only when the
/// local buffer is empty. Configure a read timeout or non-blocking mode on
/// the stream so that refills return promptly when the line is idle; a
/// `WouldBlock` or `TimedOut` error counts as "nothing available".
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
    inbound: VecDeque<u8>,
    chunk: Box<[u8]>,
    write_error: bool,
    eof: bool,
}

impl<S: Read + Write> StreamTransport<S> {
    /// Wrap a stream with the default read chunk size.
    #[must_use]
    pub fn new(stream: S) -> Self {
        Self::with_capacity(stream, DEFAULT_READ_CHUNK)
    }

    /// Wrap a stream, reading up to `chunk_size` bytes per refill.
    #[must_use]
    pub fn with_capacity(stream: S, chunk_size: usize) -> Self {
        Self {
            stream,
            inbound: VecDeque::with_capacity(chunk_size),
            chunk: vec![0u8; chunk_size.max(1)].into_boxed_slice(),
            write_error: false,
            eof: false,
        }
    }

    /// Whether the stream has reported end of file.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.eof
    }

    /// Access the wrapped stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Mutable access to the wrapped stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Unwrap, discarding any buffered inbound bytes.
    pub fn into_inner(self) -> S {
        self.stream
    }

    fn refill(&mut self) {
        if self.eof {
            return;
        }
        match self.stream.read(&mut self.chunk) {
            Ok(0) => self.eof = true,
            Ok(n) => self.inbound.extend(&self.chunk[..n]),
            Err(err) if is_idle(&err) => {}
            Err(err) => warn!(error = %err, "transport read failed"),
        }
    }
}

fn is_idle(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn available(&mut self) -> usize {
        if self.inbound.is_empty() {
            self.refill();
        }
        self.inbound.len()
    }

    fn read(&mut self) -> Option<u8> {
        self.inbound.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        let mut written = 0;
        while written < bytes.len() {
            match self.stream.write(&bytes[written..]) {
                Ok(0) => {
                    warn!(written, expected = bytes.len(), "transport accepted no bytes");
                    self.write_error = true;
                    break;
                }
                Ok(n) => written += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    warn!(error = %err, written, "transport write failed");
                    self.write_error = true;
                    break;
                }
            }
        }
        written
    }

    fn flush(&mut self) {
        if let Err(err) = self.stream.flush() {
            warn!(error = %err, "transport flush failed");
            self.write_error = true;
        }
    }

    fn write_error(&self) -> bool {
        self.write_error
    }

    fn clear_write_error(&mut self) {
        self.write_error = false;
    }
}
