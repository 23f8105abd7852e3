//! State store
//!
//! Holds the single current snapshot. The update driver is the only writer;
//! the broadcast hub reads it when sending. Guarded by a `RwLock` so field
//! updates are atomic: no reader ever observes a half-applied update.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use super::snapshot::{LyricLine, Snapshot};

/// Thread-safe store for the current now-playing snapshot
///
/// Starts out uninitialized (both fields absent). Nothing derived from the
/// uninitialized state is sent to subscribers; the broadcast hub checks
/// [`StateStore::is_initialized`] before sending.
#[derive(Debug)]
pub struct StateStore {
    inner: RwLock<Snapshot>,
    initialized: AtomicBool,
}

impl StateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Snapshot::default()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Get a copy of the current snapshot
    pub async fn snapshot(&self) -> Snapshot {
        self.inner.read().await.clone()
    }

    /// Get the current playback timestamp
    pub async fn timestamp(&self) -> Option<u64> {
        self.inner.read().await.timestamp
    }

    /// Replace the lyrics field
    ///
    /// An empty sequence is normalized to `None`: absence is its own value
    /// and an empty-but-present list never occurs.
    pub async fn set_lyrics(&self, lines: Option<Vec<LyricLine>>) {
        let lines = lines.filter(|l| !l.is_empty());
        self.inner.write().await.lyrics = lines;
        self.initialized.store(true, Ordering::Release);
    }

    /// Replace the playback timestamp (milliseconds)
    pub async fn set_timestamp(&self, ms: u64) {
        self.inner.write().await.timestamp = Some(ms);
        self.initialized.store(true, Ordering::Release);
    }

    /// Whether the store has completed its first refresh
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
