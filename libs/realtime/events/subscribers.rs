use super::inbound::{EventKind, InboundEvent};
use serde_json::Value;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// Callback for message and notification payloads
pub type PayloadCallback = Box<dyn Fn(Value) + Send + Sync>;

/// Callback for presence events, receives the user id
pub type PresenceCallback = Box<dyn Fn(String) + Send + Sync>;

/// The callbacks registered when a channel is mounted
///
/// At most one callback per event kind. An absent callback means events of
/// that kind are decoded and then discarded.
///
/// ```ignore
/// let subscribers = Subscribers::new()
///     .on_notification(|notification| badge.bump(notification))
///     .on_user_offline(|user_id| presence.mark_offline(&user_id));
/// ```
#[derive(Default)]
pub struct Subscribers {
    on_message: Option<PayloadCallback>,
    on_notification: Option<PayloadCallback>,
    on_user_online: Option<PresenceCallback>,
    on_user_offline: Option<PresenceCallback>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_message(mut self, callback: impl Fn(Value) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Box::new(callback));
        self
    }

    pub fn on_notification(mut self, callback: impl Fn(Value) + Send + Sync + 'static) -> Self {
        self.on_notification = Some(Box::new(callback));
        self
    }

    pub fn on_user_online(mut self, callback: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.on_user_online = Some(Box::new(callback));
        self
    }

    pub fn on_user_offline(mut self, callback: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.on_user_offline = Some(Box::new(callback));
        self
    }

    /// Whether a callback is registered for `kind`
    pub fn is_registered(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::MessageReceived => self.on_message.is_some(),
            EventKind::Notification => self.on_notification.is_some(),
            EventKind::UserOnline => self.on_user_online.is_some(),
            EventKind::UserOffline => self.on_user_offline.is_some(),
        }
    }

    /// Hand `event` to the callback registered for its kind.
    ///
    /// Returns `false` when no callback is registered. A panicking callback
    /// is logged and swallowed so the channel keeps dispatching.
    pub fn dispatch(&self, event: InboundEvent) -> bool {
        let kind = event.kind();
        match event {
            InboundEvent::MessageReceived(payload) => {
                invoke(kind, self.on_message.as_deref(), payload)
            }
            InboundEvent::Notification(payload) => {
                invoke(kind, self.on_notification.as_deref(), payload)
            }
            InboundEvent::UserOnline(user_id) => {
                invoke(kind, self.on_user_online.as_deref(), user_id)
            }
            InboundEvent::UserOffline(user_id) => {
                invoke(kind, self.on_user_offline.as_deref(), user_id)
            }
        }
    }
}

fn invoke<T>(kind: EventKind, callback: Option<&(dyn Fn(T) + Send + Sync)>, arg: T) -> bool {
    let Some(callback) = callback else {
        return false;
    };

    if panic::catch_unwind(AssertUnwindSafe(|| callback(arg))).is_err() {
        error!(kind = %kind, "Subscriber callback panicked");
    }
    true
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<&str> = EventKind::ALL
            .into_iter()
            .filter(|kind| self.is_registered(*kind))
            .map(|kind| kind.as_str())
            .collect();
        f.debug_struct("Subscribers")
            .field("registered", &registered)
            .finish()
    }
}
