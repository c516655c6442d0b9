//! Social network payload types
//!
//! Typed views over the JSON the realtime endpoint pushes. The channel hands
//! subscribers raw `serde_json::Value`s; consumers that want structure call
//! `from_payload` on the type they expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Deserialize a typed view out of a raw event payload
pub trait FromPayload: Sized {
    fn from_payload(payload: Value) -> Result<Self, serde_json::Error>;
}

impl<T> FromPayload for T
where
    T: for<'de> Deserialize<'de>,
{
    fn from_payload(payload: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(payload)
    }
}

/// Public profile of a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    /// Kept as sent; the server does not promise a format
    #[serde(default)]
    pub date_of_birth: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Nickname if set, otherwise "First Last"
    pub fn display_name(&self) -> String {
        match &self.nickname {
            Some(nickname) if !nickname.is_empty() => nickname.clone(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Emoji,
}

/// A chat message, as carried by `message_received`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    /// Not every push embeds the sender profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<User>,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    Private,
    Group,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    #[serde(default)]
    pub participants: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    #[serde(default)]
    pub unread_count: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    FollowRequest,
    GroupInvitation,
    EventCreated,
    PostLiked,
    /// Anything newer than this client
    #[serde(other)]
    Other,
}

/// A notification, as carried by the `notification` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Kind-specific extras, passed through untouched
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Presence change for one user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PresenceUpdate {
    pub user_id: String,
    pub online: bool,
}

impl PresenceUpdate {
    pub fn online(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            online: true,
        }
    }

    pub fn offline(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            online: false,
        }
    }
}
