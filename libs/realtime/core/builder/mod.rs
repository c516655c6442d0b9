pub mod states;

use crate::core::channel::RealtimeChannel;
use crate::core::config::ChannelConfig;
use crate::core::tungstenite::TungsteniteConnector;
use crate::events::Subscribers;
use crate::traits::*;
use states::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Type-state builder for RealtimeChannel
///
/// The endpoint URL and the subscriber set must be provided before the
/// channel can be built. Defaults: fixed 3s reconnect, no handshake
/// timeout, tungstenite transport.
pub struct ChannelBuilder<U, S>
where
    U: UrlState,
    S: SubscriberState,
{
    _state: TypeState<U, S>,
    url: Option<String>,
    subscribers: Option<Subscribers>,
    connector: Option<Arc<dyn Connector>>,
    headers: Option<Arc<dyn HeaderProvider>>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    connect_timeout: Option<Duration>,
}

impl ChannelBuilder<NoUrl, NoSubscribers> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            url: None,
            subscribers: None,
            connector: None,
            headers: None,
            reconnect_strategy: None,
            connect_timeout: None, // Default: wait indefinitely
        }
    }
}

impl Default for ChannelBuilder<NoUrl, NoSubscribers> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U, S> ChannelBuilder<U, S>
where
    U: UrlState,
    S: SubscriberState,
{
    fn into_state<U2, S2>(self) -> ChannelBuilder<U2, S2>
    where
        U2: UrlState,
        S2: SubscriberState,
    {
        ChannelBuilder {
            _state: TypeState::new(),
            url: self.url,
            subscribers: self.subscribers,
            connector: self.connector,
            headers: self.headers,
            reconnect_strategy: self.reconnect_strategy,
            connect_timeout: self.connect_timeout,
        }
    }

    /// Replace the reconnection strategy (default: [`FixedDelay::default`])
    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Fixed delay between reconnects, unlimited attempts
    pub fn reconnect_delay(self, delay: Duration) -> Self {
        self.reconnect_strategy(FixedDelay::new(delay, None))
    }

    /// Give up on a handshake after `timeout` and treat it as a failed attempt
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Use a custom transport (defaults to [`TungsteniteConnector`])
    pub fn connector(mut self, connector: impl Connector) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Handshake headers for the default connector
    pub fn headers(mut self, provider: impl HeaderProvider + 'static) -> Self {
        self.headers = Some(Arc::new(provider));
        self
    }
}

// URL setting
impl<S> ChannelBuilder<NoUrl, S>
where
    S: SubscriberState,
{
    pub fn url(self, url: impl Into<String>) -> ChannelBuilder<HasUrl, S> {
        let mut builder: ChannelBuilder<HasUrl, S> = self.into_state();
        builder.url = Some(url.into());
        builder
    }
}

// Subscriber setting
impl<U> ChannelBuilder<U, NoSubscribers>
where
    U: UrlState,
{
    pub fn subscribers(self, subscribers: Subscribers) -> ChannelBuilder<U, HasSubscribers> {
        let mut builder: ChannelBuilder<U, HasSubscribers> = self.into_state();
        builder.subscribers = Some(subscribers);
        builder
    }
}

impl ChannelBuilder<HasUrl, HasSubscribers> {
    /// Build the channel without connecting. Call
    /// [`RealtimeChannel::connect`] to open it.
    pub fn build(self) -> RealtimeChannel {
        let connector: Arc<dyn Connector> = match (self.connector, self.headers) {
            (Some(connector), None) => connector,
            (Some(connector), Some(_)) => {
                warn!("Handshake headers are ignored when a custom connector is set");
                connector
            }
            (None, Some(headers)) => Arc::new(TungsteniteConnector::with_headers(headers)),
            (None, None) => Arc::new(TungsteniteConnector::new()),
        };

        let config = ChannelConfig {
            // Both are guaranteed by the type state
            url: self.url.unwrap_or_default(),
            connector,
            reconnect_strategy: self
                .reconnect_strategy
                .unwrap_or_else(|| Box::new(FixedDelay::default())),
            connect_timeout: self.connect_timeout,
        };

        RealtimeChannel::new(config, self.subscribers.unwrap_or_default())
    }

    /// Build and connect in one step: the channel is open for as long as the
    /// returned value lives.
    pub fn mount(self) -> RealtimeChannel {
        let channel = self.build();
        channel.connect();
        channel
    }
}
