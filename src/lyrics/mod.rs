//! Lyrics lookup
//!
//! The remote lyrics service is an opaque asynchronous fetch: given a track
//! identifier it returns synchronized lyric lines, or nothing. Failures and
//! "no lyrics" responses both resolve to an absent-lyrics snapshot upstream;
//! subscribers never see an error frame.

pub mod http;
pub mod provider;

pub use http::ColorLyricsClient;
pub use provider::LyricsProvider;
