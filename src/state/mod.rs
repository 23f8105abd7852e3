//! Now-playing state
//!
//! The snapshot types that describe the current track's lyrics and playback
//! position, and the store that holds the single current snapshot.

pub mod snapshot;
pub mod store;

pub use snapshot::{LyricLine, Snapshot, Word};
pub use store::StateStore;
