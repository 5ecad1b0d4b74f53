use super::FrameError;

/// Per-link counters for traffic and rejected frames.
///
/// Each [`Node`](crate::Node) and [`Host`](crate::Host) owns one, so
/// independent links never share counts.
#[derive(Debug, Default, Clone)]
pub(crate) struct Metrics {
    snapshot: MetricsSnapshot,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_byte(&mut self) {
        self.snapshot.bytes_received += 1;
    }

    #[inline]
    pub(crate) fn record_dispatch(&mut self) {
        self.snapshot.frames_dispatched += 1;
    }

    #[inline]
    pub(crate) fn record_sent(&mut self) {
        self.snapshot.frames_sent += 1;
    }

    #[inline]
    pub(crate) fn record_reject(&mut self, error: &FrameError) {
        let counter = match error {
            FrameError::Sync { .. } => &mut self.snapshot.sync_errors,
            FrameError::Length { .. } => &mut self.snapshot.length_errors,
            FrameError::UnknownIdentifier { .. } => &mut self.snapshot.unknown_identifiers,
            FrameError::ChecksumMismatch { .. } => &mut self.snapshot.checksum_mismatches,
            FrameError::Overflow { .. } | FrameError::Truncated { .. } => {
                &mut self.snapshot.overflows
            }
        };
        *counter += 1;
    }

    #[inline]
    pub(crate) fn totals(&self) -> MetricsSnapshot {
        self.snapshot
    }
}

/// Lightweight snapshot of link counters.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Bytes read from the transport
    pub bytes_received: u64,
    /// Frames that passed validation and were handed on
    pub frames_dispatched: u64,
    /// Frames written to the transport
    pub frames_sent: u64,
    /// Bytes dropped while waiting for a sync byte
    pub sync_errors: u64,
    /// Frames dropped for a length byte outside `[4, 64]`
    pub length_errors: u64,
    /// Frames dropped for an identifier with no handler
    pub unknown_identifiers: u64,
    /// Frames dropped for a bad checksum
    pub checksum_mismatches: u64,
    /// Frames dropped for overrunning the receive buffer
    pub overflows: u64,
}

impl MetricsSnapshot {
    /// Sum of every rejection counter.
    #[must_use]
    pub fn total_rejections(&self) -> u64 {
        self.sync_errors
            + self.length_errors
            + self.unknown_identifiers
            + self.checksum_mismatches
            + self.overflows
    }

    /// Fraction of received bytes that were dropped as line noise.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn noise_ratio(&self) -> Option<f64> {
        if self.bytes_received == 0 {
            return None;
        }

        Some(self.sync_errors as f64 / self.bytes_received as f64)
    }
}
