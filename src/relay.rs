//! Relay assembly
//!
//! Wires the store, connection table, broadcast hub, supervisor, and update
//! driver together behind one handle the host application runs.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::RelayConfig;
use crate::driver::{PlayerEvent, UpdateDriver};
use crate::hub::{BroadcastHub, ConnectionSupervisor, ConnectionTable};
use crate::lyrics::LyricsProvider;
use crate::state::StateStore;
use crate::stats::{RelayStats, StatsSnapshot};

/// The now-playing relay
///
/// # Example
/// ```no_run
/// use lyric_relay::{ColorLyricsClient, LyricRelay, PlayerEvent, RelayConfig};
///
/// # async fn example() -> lyric_relay::Result<()> {
/// let config = RelayConfig::with_addresses(["127.0.0.1:5001/ws"]);
/// let provider = ColorLyricsClient::new()?;
/// let (relay, events) = LyricRelay::new(config, provider);
///
/// // Feed host player events from wherever they originate
/// tokio::spawn(async move {
///     let _ = events
///         .send(PlayerEvent::TrackChanged { track_id: Some("4uLU6hMC".into()) })
///         .await;
/// });
///
/// relay.run().await;
/// # Ok(())
/// # }
/// ```
pub struct LyricRelay<P: LyricsProvider> {
    config: RelayConfig,
    store: Arc<StateStore>,
    table: Arc<ConnectionTable>,
    supervisor: Arc<ConnectionSupervisor>,
    driver: UpdateDriver<P>,
    stats: Arc<RelayStats>,
    events: Option<mpsc::Receiver<PlayerEvent>>,
}

impl<P: LyricsProvider> LyricRelay<P> {
    /// Create a relay with the given configuration and lyrics provider
    ///
    /// Returns the relay and the sender for player events.
    pub fn new(config: RelayConfig, provider: P) -> (Self, mpsc::Sender<PlayerEvent>) {
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer);

        let store = Arc::new(StateStore::new());
        let table = Arc::new(ConnectionTable::new());
        let stats = Arc::new(RelayStats::new());
        let hub = Arc::new(BroadcastHub::new(
            Arc::clone(&store),
            Arc::clone(&table),
            Arc::clone(&stats),
        ));
        let supervisor = Arc::new(ConnectionSupervisor::new(
            config.clone(),
            Arc::clone(&table),
            Arc::clone(&hub),
            Arc::clone(&stats),
        ));
        let driver = UpdateDriver::new(Arc::clone(&store), hub, Arc::new(provider));

        let relay = Self {
            config,
            store,
            table,
            supervisor,
            driver,
            stats,
            events: Some(event_rx),
        };

        (relay, event_tx)
    }

    /// The shared state store (read access for diagnostics)
    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// The connection table (read access for diagnostics)
    pub fn connections(&self) -> &Arc<ConnectionTable> {
        &self.table
    }

    /// Current relay counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Run the relay until the event channel closes
    ///
    /// Dropping every event sender is the host's way of stopping the relay.
    pub async fn run(self) {
        self.run_until(std::future::pending::<()>()).await;
    }

    /// Run the relay until the event channel closes or `shutdown` resolves
    ///
    /// On exit, all pending reconnect timers are cancelled and all open
    /// connections are closed.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Some(events) = self.events.take() else {
            return;
        };

        self.supervisor.connect_all().await;
        tracing::info!(
            subscribers = self.config.addresses.len(),
            "Lyric relay running"
        );

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
            }
            _ = self.driver.run(events) => {
                tracing::info!("Event channel closed, stopping");
            }
        }

        self.supervisor.shutdown().await;
    }
}
