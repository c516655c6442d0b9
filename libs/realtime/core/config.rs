use crate::traits::*;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Endpoint used when nothing else is configured
pub const DEFAULT_WS_URL: &str = "ws://localhost:8080/ws";

/// Configuration for a RealtimeChannel
///
/// Built by [`ChannelBuilder`](crate::ChannelBuilder) and shared read-only
/// with the driver task.
pub struct ChannelConfig {
    /// WebSocket URL (ws:// or wss://)
    pub(crate) url: String,

    /// Opens the transport on every (re)connect
    pub(crate) connector: Arc<dyn Connector>,

    /// Decides the delay before each reconnect
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,

    /// Handshake timeout; `None` waits indefinitely
    pub(crate) connect_timeout: Option<Duration>,
}

impl ChannelConfig {
    /// Get a reference to the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Delay the strategy would apply after the first failure
    pub fn first_reconnect_delay(&self) -> Option<Duration> {
        self.reconnect_strategy.next_delay(0)
    }
}

impl fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("url", &self.url)
            .field("connect_timeout", &self.connect_timeout)
            .field("first_reconnect_delay", &self.first_reconnect_delay())
            .finish_non_exhaustive()
    }
}
