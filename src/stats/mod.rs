//! Relay counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Lifetime counters for a relay instance
///
/// All counters are monotonic. Updated with relaxed atomics; reads are
/// advisory (logs, diagnostics), never part of control flow.
#[derive(Debug, Default)]
pub struct RelayStats {
    connects: AtomicU64,
    connect_failures: AtomicU64,
    reconnects: AtomicU64,
    broadcasts: AtomicU64,
    frames_sent: AtomicU64,
    sends_skipped: AtomicU64,
}

impl RelayStats {
    /// Create a new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_connect_failure(&self) {
        self.connect_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_send_skipped(&self) {
        self.sends_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            connects: self.connects.load(Ordering::Relaxed),
            connect_failures: self.connect_failures.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            sends_skipped: self.sends_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`RelayStats`]
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    /// Connections opened successfully
    pub connects: u64,
    /// Connect attempts that failed or timed out
    pub connect_failures: u64,
    /// Reconnect delays scheduled
    pub reconnects: u64,
    /// Full-fanout broadcasts performed
    pub broadcasts: u64,
    /// Individual frames written to handles
    pub frames_sent: u64,
    /// Sends skipped because the handle was closed or missing
    pub sends_skipped: u64,
}
