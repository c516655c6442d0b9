use std::future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, Sleep};
use tracing::debug;

/// The channel's single pending-reconnect slot
///
/// Scheduling always cancels whatever was pending first, so at most one
/// reconnect is ever armed.
#[derive(Debug, Default)]
pub(crate) struct ReconnectTimer {
    pending: Option<Pin<Box<Sleep>>>,
}

impl ReconnectTimer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn schedule(&mut self, delay: Duration) {
        if self.cancel() {
            debug!("Replaced pending reconnect timer");
        }
        self.pending = Some(Box::pin(sleep(delay)));
    }

    /// Drop the pending timer. Returns whether one was armed.
    pub(crate) fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolves when the armed timer elapses; never resolves when nothing is
    /// armed. Cancel-safe: dropping this future keeps the timer armed.
    pub(crate) async fn fired(&mut self) {
        match self.pending.as_mut() {
            Some(timer) => {
                timer.as_mut().await;
                self.pending = None;
            }
            None => future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Instant};

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let mut timer = ReconnectTimer::new();
        let start = Instant::now();
        timer.schedule(Duration::from_millis(3000));
        assert!(timer.is_pending());

        timer.fired().await;

        assert!(start.elapsed() >= Duration::from_millis(3000));
        assert!(start.elapsed() < Duration::from_millis(3010));
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_previous() {
        let mut timer = ReconnectTimer::new();
        let start = Instant::now();
        timer.schedule(Duration::from_millis(3000));
        timer.schedule(Duration::from_millis(500));

        timer.fired().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert!(start.elapsed() < Duration::from_millis(3000));

        // Nothing left armed
        assert!(timeout(Duration::from_secs(10), timer.fired()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let mut timer = ReconnectTimer::new();
        timer.schedule(Duration::from_millis(100));
        assert!(timer.cancel());
        assert!(!timer.cancel());

        assert!(timeout(Duration::from_secs(1), timer.fired()).await.is_err());
    }
}
