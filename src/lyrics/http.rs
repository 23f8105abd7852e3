//! Color-lyrics HTTP client
//!
//! Fetches line-synchronized lyrics from the player's color-lyrics endpoint:
//! `GET <base>/<track_id>?format=json`. The response carries a sync type and
//! the lines; anything other than line-synced lyrics resolves to `None`.

use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::state::LyricLine;

use super::provider::LyricsProvider;

/// Default lyrics endpoint
pub const DEFAULT_BASE_URL: &str = "https://spclient.wg.spotify.com/color-lyrics/v2/track";

const USER_AGENT: &str = concat!("lyric-relay/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP lyrics client
pub struct ColorLyricsClient {
    http: reqwest::Client,
    base_url: String,
}

impl ColorLyricsClient {
    /// Create a client against the default endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

impl LyricsProvider for ColorLyricsClient {
    async fn fetch_lyrics(&self, track_id: &str) -> Result<Option<Vec<LyricLine>>> {
        let url = format!("{}/{}?format=json", self.base_url, track_id);

        let response = self.http.get(&url).send().await?.error_for_status()?;
        let parsed: ColorLyricsResponse = response.json().await?;

        Ok(parsed.into_lines())
    }
}

#[derive(Debug, Deserialize)]
struct ColorLyricsResponse {
    lyrics: Option<LyricsBody>,
}

#[derive(Debug, Deserialize)]
struct LyricsBody {
    #[serde(rename = "syncType")]
    sync_type: Option<String>,
    lines: Option<Vec<LyricLine>>,
}

impl ColorLyricsResponse {
    fn into_lines(self) -> Option<Vec<LyricLine>> {
        let body = self.lyrics?;

        // Unsynced lyrics cannot drive a timestamped display
        if body.sync_type.as_deref() == Some("UNSYNCED") {
            return None;
        }

        body.lines.filter(|lines| !lines.is_empty())
    }
}
