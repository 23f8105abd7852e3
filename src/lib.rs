//! # lyric-relay
//!
//! Mirrors a media player's currently-playing state (track lyrics and
//! playback timestamp) to external subscribers over persistent WebSocket
//! connections. The relay is the client: it connects outward to every
//! configured subscriber endpoint, keeps each one synchronized with the
//! latest snapshot, and transparently reconnects after any closure.
//!
//! # Data flow
//!
//! ```text
//! host player events ──► UpdateDriver ──► StateStore
//!                              │              ▲
//!                      broadcast_all()        │ catch-up read
//!                              ▼              │
//!                        BroadcastHub ◄── ConnectionSupervisor
//!                              │           (reconnect loops)
//!                              ▼
//!                  {"lyrics": ...}  {"time": ...}   per subscriber
//! ```
//!
//! Every state change pushes two JSON frames (lyrics, then time) to each
//! open connection; a connection that (re)opens receives a catch-up send of
//! the full current snapshot, so late joiners never miss state.
//!
//! No failure here is fatal: transport drops schedule a reconnect, lyrics
//! fetch failures resolve to an absent-lyrics snapshot, and everything is
//! reported through `tracing` logs only.

pub mod config;
pub mod driver;
pub mod error;
pub mod hub;
pub mod lyrics;
pub mod relay;
pub mod state;
pub mod stats;
pub mod wire;

pub use config::RelayConfig;
pub use driver::{PlayerEvent, UpdateDriver};
pub use error::{Error, Result};
pub use hub::{BroadcastHub, ConnectionHandle, ConnectionSupervisor, ConnectionTable};
pub use lyrics::{ColorLyricsClient, LyricsProvider};
pub use relay::LyricRelay;
pub use state::{LyricLine, Snapshot, StateStore, Word};
pub use stats::{RelayStats, StatsSnapshot};
