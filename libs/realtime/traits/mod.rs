//! # Realtime Traits
//!
//! Core traits and types shared by the channel manager:
//!
//! - **Connector / Transport**: open and drive one duplex connection
//! - **ReconnectionStrategy**: decide when to retry after a close
//! - **HeaderProvider**: attach handshake headers (session cookie, bearer token)
//! - **WsMessage**: a text or binary frame as seen by the channel
//!
//! ## Example
//!
//! ```rust,ignore
//! use realtime::*;
//!
//! struct LoopbackConnector;
//!
//! #[async_trait]
//! impl Connector for LoopbackConnector {
//!     async fn connect(&self, url: &str) -> Result<Box<dyn Transport>> {
//!         // Open your transport here
//!     }
//! }
//! ```

pub mod error;
pub mod frame;
pub mod headers;
pub mod reconnect;
pub mod transport;

// Re-export commonly used types
pub use error::{RealtimeError, Result};
pub use frame::WsMessage;
pub use headers::{HeaderProvider, Headers, StaticHeaders};
pub use reconnect::{FixedDelay, NeverReconnect, ReconnectionStrategy, DEFAULT_RECONNECT_DELAY};
pub use transport::{Connector, Transport};
