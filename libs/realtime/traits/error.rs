use std::time::Duration;
use thiserror::Error;

/// Main error type for the realtime channel
///
/// These never escape the public channel operations; they travel across the
/// transport seam and out of the frame decoder, where the driver logs them.
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// WebSocket connection or I/O error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed unexpectedly
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Handshake did not complete within the configured timeout
    #[error("Handshake timed out after {0:?}")]
    Timeout(Duration),

    /// Frame could not be decoded into an envelope
    #[error("Decode error: {0}")]
    Decode(String),

    /// Envelope carried a `type` this client does not know
    #[error("Unrecognised event type: {0}")]
    UnknownEventType(String),

    /// Outbound payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for realtime operations
pub type Result<T> = std::result::Result<T, RealtimeError>;
