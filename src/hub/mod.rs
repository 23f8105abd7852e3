//! Subscriber-broadcast hub
//!
//! The core of the relay: a set of named outbound WebSocket connections, kept
//! synchronized with the latest snapshot and transparently re-established
//! after any closure.
//!
//! # Architecture
//!
//! ```text
//!            Arc<StateStore>                Arc<ConnectionTable>
//!                  │                                │
//!                  ▼                                ▼
//!            BroadcastHub ──── open handles ── ConnectionSupervisor
//!                  │                                │ one supervised
//!       lyrics + time frames                        │ task per address
//!                  │                                ▼
//!                  └──► handle.send_text() ──► writer task ──► WebSocket
//! ```
//!
//! The supervisor is the only writer of the connection table; the hub only
//! ever iterates a point-in-time view of the open entries. A newly opened
//! connection receives a catch-up send of the full current snapshot before
//! any broadcast can reach it, so a late joiner never misses state (at worst
//! it sees the same snapshot twice).

pub mod broadcast;
pub mod supervisor;
pub mod table;

pub use broadcast::BroadcastHub;
pub use supervisor::ConnectionSupervisor;
pub use table::{ConnectionHandle, ConnectionTable};
