use crate::traits::error::Result;
use crate::traits::frame::WsMessage;
use async_trait::async_trait;

/// One open duplex connection.
///
/// Owned exclusively by the channel driver; subscribers never see it.
#[async_trait]
pub trait Transport: Send {
    /// Wait for the next data frame.
    ///
    /// Returns `None` once the peer has closed the connection. Must be
    /// cancel-safe: the driver polls it inside `select!`.
    async fn recv(&mut self) -> Option<Result<WsMessage>>;

    /// Write one frame
    async fn send(&mut self, message: WsMessage) -> Result<()>;

    /// Close the connection. Errors are not interesting at this point.
    async fn close(&mut self);
}

/// Opens transports to an endpoint
///
/// The production implementation is [`crate::TungsteniteConnector`]; tests
/// substitute in-memory connectors to observe connection attempts.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Perform the handshake. An `Err` is a transport-establishment failure
    /// and feeds the reconnect policy.
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>>;
}
