//! Snapshot types
//!
//! A snapshot is the full now-playing state pushed to subscribers: the
//! synchronized lyrics of the current track (if any) and the playback
//! timestamp. Absence is its own value; `lyrics` is never an empty list.

use serde::{Deserialize, Serialize};

/// A single word (or word group) within a lyric line
///
/// Serialized as `{"string": "<text>"}` both on the wire and in the
/// lyrics-service response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Word text
    #[serde(rename = "string")]
    pub text: String,
}

impl Word {
    /// Create a new word
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One line of synchronized lyrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricLine {
    /// Line start time in milliseconds
    pub time: u64,
    /// Words making up the line
    pub words: Vec<Word>,
}

impl LyricLine {
    /// Create a new lyric line
    pub fn new(time: u64, words: Vec<Word>) -> Self {
        Self { time, words }
    }
}

/// The current now-playing state
///
/// `lyrics: None` means "no synchronized lyrics for the current track";
/// `timestamp: None` means playback position is not yet known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Synchronized lyric lines, or `None` when unavailable
    pub lyrics: Option<Vec<LyricLine>>,
    /// Playback position in milliseconds
    pub timestamp: Option<u64>,
}
