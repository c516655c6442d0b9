//! # Realtime core
//!
//! The channel handle, its driver, and the pieces the driver is made of:
//!
//! - **channel**: `RealtimeChannel` handle plus the driver task owning the transport
//! - **builder**: type-state builder for channels
//! - **connection_state**: lock-free lifecycle cell and counters
//! - **timer**: the single pending-reconnect slot
//! - **tungstenite**: production WebSocket transport

pub mod builder;
pub mod channel;
pub mod config;
pub mod connection_state;
pub(crate) mod timer;
pub mod tungstenite;

// Re-export main types
pub use builder::{states, ChannelBuilder};
pub use channel::{Metrics, RealtimeChannel};
pub use config::{ChannelConfig, DEFAULT_WS_URL};
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
pub use tungstenite::{TungsteniteConnector, TungsteniteTransport};

// Re-export traits for convenience
pub use crate::traits::*;

/// Create a new channel builder
///
/// # Example
/// ```ignore
/// let channel = realtime::core::builder()
///     .url("ws://localhost:8080/ws")
///     .subscribers(Subscribers::new().on_notification(|n| println!("{n}")))
///     .reconnect_delay(Duration::from_secs(3))
///     .mount();
/// ```
pub fn builder() -> ChannelBuilder<states::NoUrl, states::NoSubscribers> {
    ChannelBuilder::new()
}
