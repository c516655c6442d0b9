//! # Realtime
//!
//! Client side of the social network's realtime channel: one logical event
//! stream from the server that survives transient disconnects and fans typed
//! events out to subscriber callbacks.
//!
//! ## Features
//!
//! - **Single driver task**: the transport handle and reconnect timer are owned
//!   by one task, so there is never more than one live connection per channel
//! - **Type-state builder**: endpoint and subscribers must be set before build
//! - **Tolerant decoding**: malformed or unknown frames are logged and dropped
//! - **Fixed-delay reconnection**: 3s by default, pluggable via [`ReconnectionStrategy`]
//! - **Scoped lifetime**: `teardown()` (or dropping the channel) stops everything
//!
//! ## Example
//!
//! ```rust,ignore
//! use realtime::{RealtimeChannel, Subscribers};
//!
//! let subscribers = Subscribers::new()
//!     .on_message(|message| println!("message: {message}"))
//!     .on_user_online(|user_id| println!("{user_id} is online"));
//!
//! let channel = RealtimeChannel::builder()
//!     .url("ws://localhost:8080/ws")
//!     .subscribers(subscribers)
//!     .mount();
//!
//! channel.send(&serde_json::json!({ "type": "typing", "conversationId": "c1" }));
//! channel.shutdown().await;
//! ```

pub mod core;
pub mod events;
pub mod traits;

// Re-export all traits
pub use traits::*;

pub use self::core::{
    builder::{states, ChannelBuilder},
    channel::{Metrics, RealtimeChannel},
    config::{ChannelConfig, DEFAULT_WS_URL},
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
    tungstenite::TungsteniteConnector,
};

pub use events::{Envelope, EventKind, InboundEvent, Subscribers};
