//! Relay configuration

use std::time::Duration;

/// Relay configuration options
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Subscriber addresses to maintain connections to (host:port/path).
    /// Fixed at startup; there is no dynamic add/remove.
    pub addresses: Vec<String>,

    /// Delay between a connection closing and the next connect attempt
    pub reconnect_delay: Duration,

    /// Timeout for a single connect attempt
    pub connect_timeout: Duration,

    /// Per-connection outbound message buffer (frames)
    pub send_buffer: usize,

    /// Player event channel capacity
    pub event_buffer: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            addresses: vec!["127.0.0.1:5001/ws".to_string()],
            reconnect_delay: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(10),
            send_buffer: 64,
            event_buffer: 256,
        }
    }
}

impl RelayConfig {
    /// Create a config with the given subscriber addresses
    pub fn with_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Add a subscriber address
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.addresses.push(address.into());
        self
    }

    /// Set the reconnect delay
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-connection send buffer size
    pub fn send_buffer(mut self, frames: usize) -> Self {
        self.send_buffer = frames.max(1);
        self
    }

    /// Set the player event channel capacity
    pub fn event_buffer(mut self, events: usize) -> Self {
        self.event_buffer = events.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();

        assert_eq!(config.addresses, vec!["127.0.0.1:5001/ws".to_string()]);
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.send_buffer, 64);
        assert_eq!(config.event_buffer, 256);
    }

    #[test]
    fn test_with_addresses() {
        let config = RelayConfig::with_addresses(["10.0.0.1:5001/ws", "10.0.0.2:5001/ws"]);

        assert_eq!(config.addresses.len(), 2);
        assert_eq!(config.addresses[0], "10.0.0.1:5001/ws");
    }

    #[test]
    fn test_builder_chaining() {
        let config = RelayConfig::with_addresses(["a:1/ws"])
            .address("b:2/ws")
            .reconnect_delay(Duration::from_millis(250))
            .connect_timeout(Duration::from_secs(5))
            .send_buffer(16)
            .event_buffer(32);

        assert_eq!(config.addresses, vec!["a:1/ws", "b:2/ws"]);
        assert_eq!(config.reconnect_delay, Duration::from_millis(250));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.send_buffer, 16);
        assert_eq!(config.event_buffer, 32);
    }

    #[test]
    fn test_builder_buffer_floor() {
        // Zero-capacity channels are not representable
        let config = RelayConfig::default().send_buffer(0).event_buffer(0);

        assert_eq!(config.send_buffer, 1);
        assert_eq!(config.event_buffer, 1);
    }
}
