//! Relay error types
//!
//! Every failure the relay can hit at runtime (transport drops, fetch
//! failures) is recovered locally and logged; these types exist for the
//! boundaries where a caller can still observe the failure directly.

use tokio_tungstenite::tungstenite;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for relay operations
#[derive(Debug)]
pub enum Error {
    /// WebSocket connect or mid-stream transport failure
    Transport {
        /// Subscriber address the connection belongs to
        address: String,
        /// Underlying WebSocket error
        source: tungstenite::Error,
    },
    /// Connect attempt did not complete within the configured timeout
    ConnectTimeout(String),
    /// Handle is closed (the connection's writer task has exited)
    ConnectionClosed(String),
    /// Lyrics service request failed
    Lyrics(reqwest::Error),
    /// Wire frame encoding failed
    Encode(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Transport { address, source } => {
                write!(f, "Transport failure for {}: {}", address, source)
            }
            Error::ConnectTimeout(address) => write!(f, "Connect timed out for {}", address),
            Error::ConnectionClosed(address) => write!(f, "Connection closed for {}", address),
            Error::Lyrics(e) => write!(f, "Lyrics request failed: {}", e),
            Error::Encode(e) => write!(f, "Wire frame encoding failed: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport { source, .. } => Some(source),
            Error::Lyrics(e) => Some(e),
            Error::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Lyrics(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Encode(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_connection_closed() {
        let err = Error::ConnectionClosed("127.0.0.1:5001/ws".into());
        assert_eq!(err.to_string(), "Connection closed for 127.0.0.1:5001/ws");
    }

    #[test]
    fn test_display_connect_timeout() {
        let err = Error::ConnectTimeout("10.0.0.1:9000".into());
        assert_eq!(err.to_string(), "Connect timed out for 10.0.0.1:9000");
    }
}
