//! Update driver
//!
//! Consumes player events from an explicit channel, refreshes the state
//! store, and triggers the broadcast hub. Two triggers, each independent:
//! track changes (lyrics refresh via asynchronous fetch) and playback
//! progress (timestamp refresh with duplicate suppression).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::hub::BroadcastHub;
use crate::lyrics::LyricsProvider;
use crate::state::StateStore;

/// Events the host player feeds into the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The current track changed; `None` when nothing is playing
    TrackChanged { track_id: Option<String> },
    /// Playback progressed to the given position (milliseconds)
    Progress { position_ms: u64 },
}

/// Applies player events to the store and triggers broadcasts
///
/// Lyrics fetches are fire-and-forget tasks tagged with a sequence number;
/// a fetch whose track was superseded before it completed is discarded, so
/// the last requested track always wins.
pub struct UpdateDriver<P: LyricsProvider> {
    store: Arc<StateStore>,
    hub: Arc<BroadcastHub>,
    provider: Arc<P>,
    fetch_seq: Arc<AtomicU64>,
}

impl<P: LyricsProvider> UpdateDriver<P> {
    /// Create a driver over the given store, hub, and lyrics provider
    pub fn new(store: Arc<StateStore>, hub: Arc<BroadcastHub>, provider: Arc<P>) -> Self {
        Self {
            store,
            hub,
            provider,
            fetch_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Consume events until the channel closes
    pub async fn run(&self, mut events: mpsc::Receiver<PlayerEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        tracing::debug!("Player event channel closed");
    }

    /// Apply a single player event
    pub async fn handle_event(&self, event: PlayerEvent) {
        match event {
            PlayerEvent::TrackChanged { track_id } => self.on_track_changed(track_id).await,
            PlayerEvent::Progress { position_ms } => self.on_progress(position_ms).await,
        }
    }

    async fn on_track_changed(&self, track_id: Option<String>) {
        // Advancing the sequence first supersedes any in-flight fetch, even
        // when the new "track" is nothing at all.
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(track_id) = track_id else {
            tracing::warn!("Track changed but nothing is playing");
            return;
        };

        tracing::info!(track = %track_id, "Track changed, fetching lyrics");

        let store = Arc::clone(&self.store);
        let hub = Arc::clone(&self.hub);
        let provider = Arc::clone(&self.provider);
        let fetch_seq = Arc::clone(&self.fetch_seq);

        tokio::spawn(async move {
            let lyrics = match provider.fetch_lyrics(&track_id).await {
                Ok(lines) => lines,
                Err(e) => {
                    tracing::warn!(track = %track_id, error = %e, "Lyrics fetch failed");
                    None
                }
            };

            if fetch_seq.load(Ordering::SeqCst) != seq {
                tracing::debug!(track = %track_id, "Discarding lyrics for superseded track");
                return;
            }

            store.set_lyrics(lyrics).await;
            hub.broadcast_all().await;
        });
    }

    async fn on_progress(&self, position_ms: u64) {
        // Duplicate progress ticks are a no-op
        if self.store.timestamp().await == Some(position_ms) {
            return;
        }

        self.store.set_timestamp(position_ms).await;
        self.hub.broadcast_all().await;
    }
}
