//! Lyrics provider trait

use std::future::Future;

use crate::error::Result;
use crate::state::LyricLine;

/// Source of synchronized lyrics for a track
///
/// `Ok(None)` means the track has no synchronized lyrics; `Err` means the
/// lookup itself failed. The update driver treats both the same way
/// (absent lyrics), so implementations should not conflate the two just to
/// simplify a caller.
pub trait LyricsProvider: Send + Sync + 'static {
    /// Fetch synchronized lyrics for a track identifier
    fn fetch_lyrics(
        &self,
        track_id: &str,
    ) -> impl Future<Output = Result<Option<Vec<LyricLine>>>> + Send;
}
