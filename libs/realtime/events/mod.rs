//! Inbound event decoding and subscriber dispatch
//!
//! ```text
//! Transport → WsMessage → Envelope { type, data } → InboundEvent → Subscribers
//!                              ↓                          ↓
//!                     malformed: logged, dropped   unregistered: discarded
//! ```
//!
//! Events are dispatched inline, in arrival order, on the channel driver.

pub mod inbound;
pub mod subscribers;

pub use inbound::{Envelope, EventKind, InboundEvent};
pub use subscribers::{PayloadCallback, PresenceCallback, Subscribers};
