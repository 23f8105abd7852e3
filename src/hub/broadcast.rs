//! Broadcast hub
//!
//! Fan-out of the current snapshot to subscriber connections. Two paths:
//! a full broadcast after every detected state change, and a single-target
//! catch-up send when a connection (re)opens. Both read the then-current
//! snapshot, so a late joiner can at worst receive a duplicate of the same
//! snapshot, never miss one.

use std::sync::Arc;

use crate::error::Result;
use crate::state::StateStore;
use crate::stats::RelayStats;

use super::table::{ConnectionHandle, ConnectionTable};
use crate::wire;

/// Sends the current snapshot to subscriber connections
///
/// Reads the connection table; never mutates it. Send failures are logged
/// and skipped: a dead handle self-heals through reconnection and the next
/// broadcast or catch-up supersedes anything it missed.
pub struct BroadcastHub {
    store: Arc<StateStore>,
    table: Arc<ConnectionTable>,
    stats: Arc<RelayStats>,
}

impl BroadcastHub {
    /// Create a hub over the given store and table
    pub fn new(store: Arc<StateStore>, table: Arc<ConnectionTable>, stats: Arc<RelayStats>) -> Self {
        Self {
            store,
            table,
            stats,
        }
    }

    /// Send the full current snapshot to a single address (catch-up send)
    ///
    /// Skipped with a log line if the store is still uninitialized or the
    /// address has no open handle.
    pub async fn send_snapshot(&self, address: &str) {
        if !self.store.is_initialized() {
            tracing::debug!(address = %address, "Catch-up skipped: no snapshot yet");
            return;
        }

        let Some(handle) = self.table.get(address).await else {
            tracing::debug!(address = %address, "Catch-up skipped: no open handle");
            self.stats.record_send_skipped();
            return;
        };

        let snapshot = self.store.snapshot().await;
        let (lyrics, time) = match encode(&snapshot) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode snapshot");
                return;
            }
        };

        self.send_pair(&handle, lyrics, time).await;
        tracing::debug!(address = %address, "Catch-up snapshot sent");
    }

    /// Send the current snapshot to every open connection
    ///
    /// Runs once per detected state change. Cross-handle order is not
    /// guaranteed; per handle, the lyrics frame always precedes the time
    /// frame.
    pub async fn broadcast_all(&self) {
        if !self.store.is_initialized() {
            tracing::debug!("Broadcast skipped: no snapshot yet");
            return;
        }

        let snapshot = self.store.snapshot().await;
        let (lyrics, time) = match encode(&snapshot) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode snapshot");
                return;
            }
        };

        let handles = self.table.open_handles().await;
        self.stats.record_broadcast();

        for handle in &handles {
            self.send_pair(handle, lyrics.clone(), time.clone()).await;
        }

        tracing::debug!(subscribers = handles.len(), "Snapshot broadcast");
    }

    /// Write the lyrics frame then the time frame to one handle
    async fn send_pair(&self, handle: &ConnectionHandle, lyrics: String, time: String) {
        for frame in [lyrics, time] {
            match handle.send_text(frame).await {
                Ok(()) => self.stats.record_frame_sent(),
                Err(e) => {
                    // Expected when a connection died since the table was
                    // read; reconnection will catch the subscriber up.
                    tracing::debug!(address = %handle.address(), error = %e, "Send skipped");
                    self.stats.record_send_skipped();
                    return;
                }
            }
        }
    }
}

fn encode(snapshot: &crate::state::Snapshot) -> Result<(String, String)> {
    Ok((wire::lyrics_frame(snapshot)?, wire::time_frame(snapshot)?))
}
