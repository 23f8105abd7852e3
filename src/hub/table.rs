//! Connection table and handles
//!
//! The table maps each subscriber address to its currently-open connection
//! handle. An entry exists only while the connection is open; the supervisor
//! inserts on open and removes on close, and is the table's only writer.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;

use crate::error::{Error, Result};

/// Handle to one live outbound connection
///
/// Cheap to clone; sends go through the connection's writer task. A handle
/// whose writer task has exited reports closed and fails sends with
/// [`Error::ConnectionClosed`].
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    address: String,
    tx: mpsc::Sender<Message>,
}

impl ConnectionHandle {
    pub(crate) fn new(address: String, tx: mpsc::Sender<Message>) -> Self {
        Self { address, tx }
    }

    /// The subscriber address this handle belongs to
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether the connection's writer task is still accepting frames
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Send one JSON text frame
    pub async fn send_text(&self, frame: String) -> Result<()> {
        self.tx
            .send(Message::Text(frame.into()))
            .await
            .map_err(|_| Error::ConnectionClosed(self.address.clone()))
    }

    /// Ask the writer task to close the connection gracefully
    pub(crate) async fn close(&self) {
        let _ = self.tx.send(Message::Close(None)).await;
    }
}

/// Address → open connection handle
///
/// Never holds two handles for the same address: the per-address supervision
/// task inserts exactly one handle per successful open and removes it before
/// the next attempt.
#[derive(Debug, Default)]
pub struct ConnectionTable {
    inner: RwLock<HashMap<String, ConnectionHandle>>,
}

impl ConnectionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the handle for its address, returning any displaced handle
    pub(crate) async fn insert(&self, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        self.inner
            .write()
            .await
            .insert(handle.address().to_string(), handle)
    }

    /// Remove the handle for an address, if present
    pub(crate) async fn remove(&self, address: &str) -> Option<ConnectionHandle> {
        self.inner.write().await.remove(address)
    }

    /// Get the handle for an address, if open
    pub async fn get(&self, address: &str) -> Option<ConnectionHandle> {
        self.inner.read().await.get(address).cloned()
    }

    /// Point-in-time view of all open handles, in no guaranteed order
    pub async fn open_handles(&self) -> Vec<ConnectionHandle> {
        self.inner.read().await.values().cloned().collect()
    }

    /// Number of open connections
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the table has no open connections
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
