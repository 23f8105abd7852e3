//! Connection supervisor
//!
//! Owns one supervised task per subscriber address. Each task runs the
//! connect → open → closed loop for its address forever: on any closure or
//! failed attempt it waits the fixed reconnect delay and tries again. The
//! per-address task structure makes duplicate opens and duplicate reconnect
//! timers impossible, and the shutdown signal cancels every pending timer
//! and closes every open handle.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::config::RelayConfig;
use crate::error::{Error, Result};
use crate::stats::RelayStats;

use super::broadcast::BroadcastHub;
use super::table::{ConnectionHandle, ConnectionTable};

/// Maintains self-healing connections to all configured subscribers
pub struct ConnectionSupervisor {
    config: RelayConfig,
    table: Arc<ConnectionTable>,
    hub: Arc<BroadcastHub>,
    stats: Arc<RelayStats>,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl ConnectionSupervisor {
    /// Create a supervisor over the given table and hub
    pub fn new(
        config: RelayConfig,
        table: Arc<ConnectionTable>,
        hub: Arc<BroadcastHub>,
        stats: Arc<RelayStats>,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            table,
            hub,
            stats,
            tasks: Mutex::new(HashMap::new()),
            shutdown_tx,
        }
    }

    /// Start supervising an address
    ///
    /// Idempotent: if a supervision task for the address is already running,
    /// this does nothing. Otherwise spawns the task that owns the address's
    /// connect/reconnect loop for the lifetime of the relay.
    pub async fn connect(&self, address: &str) {
        let mut tasks = self.tasks.lock().await;

        if let Some(task) = tasks.get(address) {
            if !task.is_finished() {
                tracing::debug!(address = %address, "Already supervised, connect ignored");
                return;
            }
        }

        let task = tokio::spawn(supervise(
            address.to_string(),
            Arc::clone(&self.table),
            Arc::clone(&self.hub),
            Arc::clone(&self.stats),
            self.config.clone(),
            self.shutdown_tx.subscribe(),
        ));
        tasks.insert(address.to_string(), task);

        tracing::info!(address = %address, "Supervising subscriber connection");
    }

    /// Start supervising every configured address
    pub async fn connect_all(&self) {
        let addresses = self.config.addresses.clone();
        for address in &addresses {
            self.connect(address).await;
        }
    }

    /// Stop all supervision
    ///
    /// Cancels pending reconnect timers, closes open handles, and waits for
    /// every supervision task to exit.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);

        let mut tasks = self.tasks.lock().await;
        for (address, task) in tasks.drain() {
            if task.await.is_err() {
                tracing::warn!(address = %address, "Supervision task panicked");
            }
        }

        tracing::info!("Connection supervisor stopped");
    }
}

/// Reconnect loop for a single address
async fn supervise(
    address: String,
    table: Arc<ConnectionTable>,
    hub: Arc<BroadcastHub>,
    stats: Arc<RelayStats>,
    config: RelayConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = cancelled(&mut shutdown) => break,
            result = open_connection(&address, &config) => match result {
                Ok((handle, mut closed)) => {
                    stats.record_connect();
                    tracing::info!(address = %address, "Subscriber connection open");

                    if table.insert(handle).await.is_some() {
                        // The per-address task structure should make this
                        // unreachable.
                        tracing::warn!(address = %address, "Displaced an open handle");
                    }
                    // Late-join catch-up: the new connection gets the full
                    // current snapshot before any broadcast can reach it.
                    hub.send_snapshot(&address).await;

                    tokio::select! {
                        _ = cancelled(&mut shutdown) => {
                            if let Some(handle) = table.remove(&address).await {
                                handle.close().await;
                            }
                            break;
                        }
                        _ = &mut closed => {
                            table.remove(&address).await;
                            tracing::info!(address = %address, "Subscriber connection closed");
                        }
                    }
                }
                Err(e) => {
                    stats.record_connect_failure();
                    tracing::warn!(address = %address, error = %e, "Connect failed");
                }
            }
        }

        // Exactly one pending reconnect timer per address
        stats.record_reconnect();
        tokio::select! {
            _ = cancelled(&mut shutdown) => break,
            _ = tokio::time::sleep(config.reconnect_delay) => {
                tracing::debug!(address = %address, "Reconnecting");
            }
        }
    }

    tracing::debug!(address = %address, "Supervision ended");
}

/// Resolves once shutdown has been signalled (or the supervisor is gone)
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Establish one WebSocket connection and spawn its I/O tasks
///
/// Returns the send handle and a signal that fires when the connection
/// closes (remote close frame, transport error, or end of stream).
async fn open_connection(
    address: &str,
    config: &RelayConfig,
) -> Result<(ConnectionHandle, oneshot::Receiver<()>)> {
    let url = format!("ws://{}", address);

    let (ws, _response) = match tokio::time::timeout(config.connect_timeout, connect_async(&url))
        .await
    {
        Ok(Ok(pair)) => pair,
        Ok(Err(e)) => {
            return Err(Error::Transport {
                address: address.to_string(),
                source: e,
            })
        }
        Err(_) => return Err(Error::ConnectTimeout(address.to_string())),
    };

    let (mut sink, mut stream) = ws.split();
    let (tx, mut rx) = mpsc::channel::<Message>(config.send_buffer);
    let (closed_tx, closed_rx) = oneshot::channel::<()>();

    // Writer task: forwards queued frames to the socket
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let is_close = matches!(message, Message::Close(_));
            if sink.send(message).await.is_err() || is_close {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Reader task: the channel is push-only, so inbound frames are discarded;
    // reading exists to detect closure.
    tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Close(_)) | Err(_) => break,
                _ => {}
            }
        }
        let _ = closed_tx.send(());
    });

    Ok((ConnectionHandle::new(address.to_string(), tx), closed_rx))
}
