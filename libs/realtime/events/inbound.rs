use crate::traits::{RealtimeError, Result, WsMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Route key of an inbound event: the envelope's `type` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MessageReceived,
    Notification,
    UserOnline,
    UserOffline,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::MessageReceived,
        EventKind::Notification,
        EventKind::UserOnline,
        EventKind::UserOffline,
    ];

    /// Wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MessageReceived => "message_received",
            EventKind::Notification => "notification",
            EventKind::UserOnline => "user_online",
            EventKind::UserOffline => "user_offline",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of every inbound frame: `{ "type": string, "data": any }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(kind: EventKind, data: Value) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            data,
        }
    }
}

/// Payload of `user_online` / `user_offline`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresencePayload {
    user_id: String,
}

/// A decoded inbound event
///
/// Message and notification payloads are server-defined and passed through
/// untouched; presence events carry only the user id.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    MessageReceived(Value),
    Notification(Value),
    UserOnline(String),
    UserOffline(String),
}

impl InboundEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InboundEvent::MessageReceived(_) => EventKind::MessageReceived,
            InboundEvent::Notification(_) => EventKind::Notification,
            InboundEvent::UserOnline(_) => EventKind::UserOnline,
            InboundEvent::UserOffline(_) => EventKind::UserOffline,
        }
    }

    /// Decode a frame delivered by the transport. Only text frames carry events.
    pub fn decode(frame: &WsMessage) -> Result<Self> {
        let text = frame
            .as_text()
            .ok_or_else(|| RealtimeError::Decode(format!("binary frame ({} bytes)", frame.len())))?;
        Self::from_json(text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| RealtimeError::Decode(e.to_string()))?;
        Self::from_envelope(envelope)
    }

    pub fn from_envelope(envelope: Envelope) -> Result<Self> {
        let kind = EventKind::from_tag(&envelope.kind)
            .ok_or(RealtimeError::UnknownEventType(envelope.kind))?;

        let event = match kind {
            EventKind::MessageReceived => InboundEvent::MessageReceived(envelope.data),
            EventKind::Notification => InboundEvent::Notification(envelope.data),
            EventKind::UserOnline => {
                InboundEvent::UserOnline(presence_user_id(kind, envelope.data)?)
            }
            EventKind::UserOffline => {
                InboundEvent::UserOffline(presence_user_id(kind, envelope.data)?)
            }
        };
        Ok(event)
    }
}

fn presence_user_id(kind: EventKind, data: Value) -> Result<String> {
    serde_json::from_value::<PresencePayload>(data)
        .map(|payload| payload.user_id)
        .map_err(|e| RealtimeError::Decode(format!("{} payload: {}", kind, e)))
}
