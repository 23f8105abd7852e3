//! Wire frames
//!
//! The push protocol to subscribers is two independent JSON text messages per
//! state change, always in this order:
//!
//! ```text
//! {"lyrics": [{"time": <ms>, "words": [{"string": "<text>"}]}, ...] | null}
//! {"time": <ms> | null}
//! ```
//!
//! `"lyrics": null` means "no synchronized lyrics for the current track".
//! The channel is push-only; subscribers never send frames back.

use serde::Serialize;

use crate::error::Result;
use crate::state::{LyricLine, Snapshot};

#[derive(Serialize)]
struct LyricsFrame<'a> {
    lyrics: Option<&'a [LyricLine]>,
}

#[derive(Serialize)]
struct TimeFrame {
    time: Option<u64>,
}

/// Encode the lyrics frame for a snapshot
pub fn lyrics_frame(snapshot: &Snapshot) -> Result<String> {
    let frame = LyricsFrame {
        lyrics: snapshot.lyrics.as_deref(),
    };
    Ok(serde_json::to_string(&frame)?)
}

/// Encode the time frame for a snapshot
pub fn time_frame(snapshot: &Snapshot) -> Result<String> {
    let frame = TimeFrame {
        time: snapshot.timestamp,
    };
    Ok(serde_json::to_string(&frame)?)
}
