//! WebSocket transport on tokio-tungstenite

use crate::traits::*;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, http, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Production connector: plain `connect_async` with optional handshake headers
#[derive(Default)]
pub struct TungsteniteConnector {
    headers: Option<Arc<dyn HeaderProvider>>,
}

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(provider: Arc<dyn HeaderProvider>) -> Self {
        Self {
            headers: Some(provider),
        }
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>> {
        let mut request = url
            .into_client_request()
            .map_err(|e| RealtimeError::WebSocket(format!("Invalid endpoint {}: {}", url, e)))?;

        if let Some(ref provider) = self.headers {
            for (key, value) in provider.get_headers().await {
                match (
                    key.parse::<http::header::HeaderName>(),
                    value.parse::<http::header::HeaderValue>(),
                ) {
                    (Ok(name), Ok(value)) => {
                        request.headers_mut().insert(name, value);
                    }
                    (Err(_), _) => warn!("Invalid header name: {}", key),
                    (_, Err(_)) => warn!("Invalid header value for key '{}'", key),
                }
            }
            debug!("Connecting with custom headers");
        }

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| RealtimeError::WebSocket(e.to_string()))?;

        Ok(Box::new(TungsteniteTransport { stream }))
    }
}

/// An open tungstenite stream
pub struct TungsteniteTransport {
    stream: WsStream,
}

#[async_trait]
impl Transport for TungsteniteTransport {
    async fn recv(&mut self) -> Option<Result<WsMessage>> {
        loop {
            match self.stream.next().await? {
                Ok(msg) => {
                    if msg.is_close() {
                        debug!("Close frame received");
                        return None;
                    }
                    // Pings are answered by tungstenite itself
                    if let Some(frame) = tungstenite_to_ws_message(msg) {
                        return Some(Ok(frame));
                    }
                }
                Err(e) => return Some(Err(map_ws_error(e))),
            }
        }
    }

    async fn send(&mut self, message: WsMessage) -> Result<()> {
        self.stream
            .send(ws_message_to_tungstenite(message))
            .await
            .map_err(map_ws_error)
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("Error while closing WebSocket: {}", e);
        }
    }
}

/// A stream that is already closed is reported as such; the rest is a
/// plain WebSocket error
fn map_ws_error(e: tungstenite::Error) -> RealtimeError {
    match e {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            RealtimeError::ConnectionClosed(e.to_string())
        }
        other => RealtimeError::WebSocket(other.to_string()),
    }
}

/// Convert WsMessage to tungstenite Message
fn ws_message_to_tungstenite(msg: WsMessage) -> Message {
    match msg {
        WsMessage::Text(text) => Message::Text(text),
        WsMessage::Binary(data) => Message::Binary(data),
    }
}

/// Convert tungstenite Message to WsMessage
fn tungstenite_to_ws_message(msg: Message) -> Option<WsMessage> {
    match msg {
        Message::Text(text) => Some(WsMessage::Text(text)),
        Message::Binary(data) => Some(WsMessage::Binary(data)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}
