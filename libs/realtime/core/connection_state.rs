use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Lifecycle of a realtime channel
///
/// ```text
/// Idle ─connect()─▶ Connecting ─handshake─▶ Open
///                     ▲    │                  │
///               timer │    └──failure──┐      │ close/error
///                     │                ▼      ▼
///               ReconnectPending ◀─── strategy ───▶ Closed (gave up)
///
/// any state ─teardown()─▶ TornDown (terminal)
/// ```
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Built but never connected
    Idle = 0,
    Connecting = 1,
    Open = 2,
    /// The reconnection strategy gave up; `connect()` may start over
    Closed = 3,
    ReconnectPending = 4,
    /// Explicit teardown, never left
    TornDown = 5,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Idle,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            3 => ConnectionState::Closed,
            4 => ConnectionState::ReconnectPending,
            _ => ConnectionState::TornDown,
        }
    }
}

/// Lock-free cell holding the channel state
///
/// The driver task writes transitions through [`transition`](Self::transition),
/// which refuses to leave `TornDown`; `teardown()` on any thread wins every
/// race against a late transport event.
#[derive(Debug)]
pub struct AtomicConnectionState {
    state: AtomicU8,
}

impl AtomicConnectionState {
    pub fn new(state: ConnectionState) -> Self {
        Self {
            state: AtomicU8::new(state as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move to `next` unless the channel has been torn down.
    ///
    /// Returns `false` (and leaves the state alone) when torn down.
    pub fn transition(&self, next: ConnectionState) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != ConnectionState::TornDown as u8).then_some(next as u8)
            })
            .is_ok()
    }

    /// Enter the terminal state. Returns `false` if it was already torn down.
    pub fn tear_down(&self) -> bool {
        self.state.swap(ConnectionState::TornDown as u8, Ordering::AcqRel)
            != ConnectionState::TornDown as u8
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.get() == ConnectionState::Open
    }

    #[inline]
    pub fn is_torn_down(&self) -> bool {
        self.get() == ConnectionState::TornDown
    }

    /// Connecting, open, or waiting on the reconnect timer
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(
            self.get(),
            ConnectionState::Connecting | ConnectionState::Open | ConnectionState::ReconnectPending
        )
    }
}

/// Channel counters, updated by the driver
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    connect_attempts: AtomicU64,
    frames_received: AtomicU64,
    frames_dropped: AtomicU64,
    messages_sent: AtomicU64,
    reconnects: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment_connect_attempts(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_reconnects(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::Relaxed)
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn reconnect_count(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_full_lifecycle() {
        let state = AtomicConnectionState::new(ConnectionState::Idle);
        assert!(!state.is_active());

        for next in [
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Closed,
            ConnectionState::ReconnectPending,
            ConnectionState::Connecting,
        ] {
            assert!(state.transition(next));
            assert_eq!(state.get(), next);
        }
        assert!(state.is_active());
    }

    #[test]
    fn test_torn_down_is_terminal() {
        let state = AtomicConnectionState::new(ConnectionState::Open);
        assert!(state.tear_down());
        assert!(!state.tear_down());

        assert!(!state.transition(ConnectionState::Connecting));
        assert!(!state.transition(ConnectionState::Open));
        assert!(state.is_torn_down());
        assert!(!state.is_open());
    }

    #[test]
    fn test_concurrent_teardown_wins_once() {
        let state = Arc::new(AtomicConnectionState::new(ConnectionState::Open));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                thread::spawn(move || state.tear_down())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_metrics_counters() {
        let metrics = AtomicMetrics::new();
        metrics.increment_connect_attempts();
        metrics.increment_connect_attempts();
        metrics.increment_received();
        metrics.increment_dropped();
        metrics.increment_sent();
        metrics.increment_reconnects();

        assert_eq!(metrics.connect_attempts(), 2);
        assert_eq!(metrics.frames_received(), 1);
        assert_eq!(metrics.frames_dropped(), 1);
        assert_eq!(metrics.messages_sent(), 1);
        assert_eq!(metrics.reconnect_count(), 1);
    }
}
