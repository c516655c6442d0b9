use crate::core::builder::states::{NoSubscribers, NoUrl};
use crate::core::builder::ChannelBuilder;
use crate::core::config::ChannelConfig;
use crate::core::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::core::timer::ReconnectTimer;
use crate::events::{InboundEvent, Subscribers};
use crate::traits::*;
use parking_lot::{Mutex, ReentrantMutex};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Commands from the channel handle to its driver
#[derive(Debug)]
enum ChannelCommand {
    /// Write a serialized payload to the connection numbered `epoch`
    Send { epoch: u64, text: String },
    /// Close everything, never reconnect
    Teardown,
}

/// Channel metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub connect_attempts: u64,
    pub frames_received: u64,
    pub frames_dropped: u64,
    pub messages_sent: u64,
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}

struct DriverHandle {
    commands: UnboundedSender<ChannelCommand>,
    task: JoinHandle<()>,
}

/// One realtime channel, owned by the consumer that mounted it
///
/// All connection work happens on a driver task spawned by
/// [`connect`](Self::connect). The driver is the only owner of the transport
/// handle and of the reconnect timer, so a reconnect can never overlap a
/// live connection.
///
/// Nothing here returns an error: transport failures feed the reconnect
/// policy, bad frames are dropped, writes while not open are discarded.
/// All of it is reported through `tracing`.
///
/// Dropping the channel tears it down.
pub struct RealtimeChannel {
    config: Arc<ChannelConfig>,
    subscribers: Arc<Subscribers>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    /// Bumped on every successful open; tags outbound payloads with the
    /// connection they were sent on
    epoch: Arc<AtomicU64>,
    /// Held while a callback runs; teardown takes it to wait out an
    /// in-flight dispatch
    dispatch_gate: Arc<ReentrantMutex<()>>,
    driver: Mutex<Option<DriverHandle>>,
}

impl RealtimeChannel {
    /// Start building a channel
    pub fn builder() -> ChannelBuilder<NoUrl, NoSubscribers> {
        ChannelBuilder::new()
    }

    pub(crate) fn new(config: ChannelConfig, subscribers: Subscribers) -> Self {
        Self {
            config: Arc::new(config),
            subscribers: Arc::new(subscribers),
            state: Arc::new(AtomicConnectionState::new(ConnectionState::Idle)),
            metrics: Arc::new(AtomicMetrics::new()),
            epoch: Arc::new(AtomicU64::new(0)),
            dispatch_gate: Arc::new(ReentrantMutex::new(())),
            driver: Mutex::new(None),
        }
    }

    /// Open the channel.
    ///
    /// Returns immediately; the handshake and every later reconnect happen on
    /// the driver task. A no-op while the channel is connecting, open or
    /// waiting to reconnect, and after teardown. Must be called from within
    /// a Tokio runtime.
    pub fn connect(&self) {
        let mut driver = self.driver.lock();

        if self.state.is_torn_down() {
            warn!(url = %self.config.url, "connect() called after teardown, ignoring");
            return;
        }

        // Closed is only ever left behind by a driver that has given up
        if self.state.is_active() {
            debug!(
                state = ?self.state.get(),
                "Realtime channel already active, ignoring connect()"
            );
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = %e, "connect() called outside a Tokio runtime, channel not opened");
                return;
            }
        };

        if !self.state.transition(ConnectionState::Connecting) {
            return;
        }

        let (commands, command_rx) = unbounded_channel();
        let channel_driver = ChannelDriver {
            config: Arc::clone(&self.config),
            subscribers: Arc::clone(&self.subscribers),
            state: Arc::clone(&self.state),
            metrics: Arc::clone(&self.metrics),
            epoch: Arc::clone(&self.epoch),
            dispatch_gate: Arc::clone(&self.dispatch_gate),
            commands: command_rx,
            timer: ReconnectTimer::new(),
            attempt: 0,
        };
        let task = runtime.spawn(channel_driver.run());

        *driver = Some(DriverHandle { commands, task });
    }

    /// Serialize `payload` as JSON and write it to the transport.
    ///
    /// Dropped without error when the channel is not open: nothing is
    /// queued for a later connection.
    pub fn send<T>(&self, payload: &T)
    where
        T: Serialize + ?Sized,
    {
        // Epoch first: a payload can only ever be tagged with an older
        // connection than the one it saw open, never a newer one
        let epoch = self.epoch.load(Ordering::Acquire);
        if !self.state.is_open() {
            debug!(
                state = ?self.state.get(),
                "Realtime channel not open, dropping outbound payload"
            );
            return;
        }

        let text = match encode(payload) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Dropping outbound payload");
                return;
            }
        };

        if let Some(driver) = self.driver.lock().as_ref() {
            if driver.commands.send(ChannelCommand::Send { epoch, text }).is_err() {
                debug!("Realtime driver gone, dropping outbound payload");
            }
        }
    }

    /// Stop the channel for good.
    ///
    /// Cancels a pending reconnect, closes the transport, and guarantees
    /// no callback starts after this returns. Safe to call repeatedly, and
    /// from inside a subscriber callback.
    pub fn teardown(&self) {
        if !self.state.tear_down() {
            debug!("Realtime channel already torn down");
            return;
        }

        info!(url = %self.config.url, "Tearing down realtime channel");

        if let Some(driver) = self.driver.lock().as_ref() {
            let _ = driver.commands.send(ChannelCommand::Teardown);
        }

        // Wait out a callback running on another thread
        drop(self.dispatch_gate.lock());
    }

    /// Tear down and wait for the driver task to exit (transport closed).
    pub async fn shutdown(&self) {
        self.teardown();

        let task = self.driver.lock().take().map(|driver| driver.task);
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Realtime driver task ended abnormally");
            }
        }
        debug!("Realtime channel shut down");
    }

    /// Current lifecycle state (diagnostics only)
    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Get current metrics
    pub fn metrics(&self) -> Metrics {
        Metrics {
            connect_attempts: self.metrics.connect_attempts(),
            frames_received: self.metrics.frames_received(),
            frames_dropped: self.metrics.frames_dropped(),
            messages_sent: self.metrics.messages_sent(),
            reconnect_count: self.metrics.reconnect_count(),
            connection_state: self.state.get(),
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }
}

fn encode<T>(payload: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    Ok(serde_json::to_string(payload)?)
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// How a connection ended
enum Outcome {
    Closed,
    TornDown,
}

enum Establish {
    /// Open transport and its epoch
    Opened(Box<dyn Transport>, u64),
    Failed,
    TornDown,
}

/// Owns the transport handle and the reconnect timer
struct ChannelDriver {
    config: Arc<ChannelConfig>,
    subscribers: Arc<Subscribers>,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    epoch: Arc<AtomicU64>,
    dispatch_gate: Arc<ReentrantMutex<()>>,
    commands: UnboundedReceiver<ChannelCommand>,
    timer: ReconnectTimer,
    /// Consecutive failed attempts since the last successful open
    attempt: usize,
}

impl ChannelDriver {
    async fn run(mut self) {
        loop {
            let outcome = match self.establish().await {
                Establish::Opened(transport, epoch) => self.pump(transport, epoch).await,
                Establish::Failed => Outcome::Closed,
                Establish::TornDown => Outcome::TornDown,
            };

            if let Outcome::TornDown = outcome {
                break;
            }

            if !self.schedule_reconnect() {
                break;
            }

            if !self.await_reconnect().await {
                break;
            }
        }

        self.timer.cancel();
        debug!(state = ?self.state.get(), "Realtime driver exiting");
    }

    /// Connecting → Open, or a failed attempt
    async fn establish(&mut self) -> Establish {
        if !self.state.transition(ConnectionState::Connecting) {
            return Establish::TornDown;
        }

        self.metrics.increment_connect_attempts();
        info!(url = %self.config.url, attempt = self.attempt, "Connecting to realtime endpoint");

        let connector = Arc::clone(&self.config.connector);
        let url = self.config.url.clone();
        let connect_timeout = self.config.connect_timeout;
        let handshake = async move {
            match connect_timeout {
                Some(limit) => tokio::time::timeout(limit, connector.connect(&url))
                    .await
                    .unwrap_or_else(|_| Err(RealtimeError::Timeout(limit))),
                None => connector.connect(&url).await,
            }
        };
        tokio::pin!(handshake);

        loop {
            tokio::select! {
                result = &mut handshake => {
                    return match result {
                        Ok(mut transport) => {
                            // Epoch moves before the state does, see `send`
                            let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
                            if !self.state.transition(ConnectionState::Open) {
                                transport.close().await;
                                return Establish::TornDown;
                            }
                            self.attempt = 0;
                            info!(url = %self.config.url, "Realtime channel open");
                            Establish::Opened(transport, epoch)
                        }
                        Err(e) => {
                            warn!(url = %self.config.url, error = %e, "Realtime connection failed");
                            Establish::Failed
                        }
                    };
                }
                command = self.commands.recv() => {
                    if !self.on_command_while_closed(command) {
                        return Establish::TornDown;
                    }
                }
            }
        }
    }

    /// Open: dispatch frames and write outbound payloads until the
    /// connection ends
    async fn pump(&mut self, mut transport: Box<dyn Transport>, epoch: u64) -> Outcome {
        loop {
            tokio::select! {
                frame = transport.recv() => match frame {
                    Some(Ok(frame)) => {
                        self.metrics.increment_received();
                        if !self.on_frame(frame) {
                            transport.close().await;
                            return Outcome::TornDown;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Realtime transport error");
                        break;
                    }
                    None => {
                        info!(url = %self.config.url, "Realtime connection closed by server");
                        break;
                    }
                },
                command = self.commands.recv() => match command {
                    Some(ChannelCommand::Send { epoch: sent_on, text }) if sent_on != epoch => {
                        debug!(
                            sent_on,
                            epoch,
                            len = text.len(),
                            "Dropping payload sent on an earlier connection"
                        );
                    }
                    Some(ChannelCommand::Send { text, .. }) => {
                        if let Err(e) = transport.send(WsMessage::Text(text)).await {
                            warn!(error = %e, "Failed to write to realtime transport");
                            break;
                        }
                        self.metrics.increment_sent();
                    }
                    Some(ChannelCommand::Teardown) | None => {
                        transport.close().await;
                        return Outcome::TornDown;
                    }
                },
            }
        }

        // Old handle is fully released before a reconnect can be scheduled
        transport.close().await;
        drop(transport);
        Outcome::Closed
    }

    /// Decode and dispatch one frame. Returns `false` once torn down.
    fn on_frame(&self, frame: WsMessage) -> bool {
        let event = match InboundEvent::decode(&frame) {
            Ok(event) => event,
            Err(RealtimeError::UnknownEventType(tag)) => {
                self.metrics.increment_dropped();
                debug!(event_type = %tag, "Unrecognised realtime event, dropping");
                return true;
            }
            Err(e) => {
                self.metrics.increment_dropped();
                warn!(error = %e, "Error parsing realtime frame, dropping");
                return true;
            }
        };

        let _gate = self.dispatch_gate.lock();
        if self.state.is_torn_down() {
            debug!("Realtime channel torn down, discarding event");
            return false;
        }

        let kind = event.kind();
        if !self.subscribers.dispatch(event) {
            debug!(kind = %kind, "No subscriber for realtime event, discarding");
        }
        true
    }

    /// Straight to ReconnectPending, or Closed when the strategy gives up.
    ///
    /// Closed is only entered right before the driver exits, which is what
    /// lets `connect()` treat it as restartable.
    fn schedule_reconnect(&mut self) -> bool {
        let strategy = &self.config.reconnect_strategy;
        let delay = strategy
            .should_reconnect(self.attempt)
            .then(|| strategy.next_delay(self.attempt))
            .flatten();

        let Some(delay) = delay else {
            if self.state.transition(ConnectionState::Closed) {
                warn!(
                    attempts = self.attempt,
                    "Reconnection strategy exhausted, channel stays closed"
                );
            }
            return false;
        };

        if !self.state.transition(ConnectionState::ReconnectPending) {
            return false;
        }

        self.timer.schedule(delay);
        info!(?delay, attempt = self.attempt + 1, "Reconnecting to realtime endpoint");
        true
    }

    /// Wait for the reconnect timer. Returns `false` on teardown.
    async fn await_reconnect(&mut self) -> bool {
        while self.timer.is_pending() {
            tokio::select! {
                _ = self.timer.fired() => {
                    self.attempt += 1;
                    self.metrics.increment_reconnects();
                    return true;
                }
                command = self.commands.recv() => {
                    if !self.on_command_while_closed(command) {
                        if self.timer.cancel() {
                            debug!("Pending reconnect cancelled");
                        }
                        return false;
                    }
                }
            }
        }
        false
    }

    /// Commands arriving while there is no open transport. Returns `false`
    /// when the driver must stop.
    fn on_command_while_closed(&self, command: Option<ChannelCommand>) -> bool {
        match command {
            Some(ChannelCommand::Send { .. }) => {
                debug!(
                state = ?self.state.get(),
                "Realtime channel not open, dropping outbound payload"
            );
                true
            }
            Some(ChannelCommand::Teardown) | None => false,
        }
    }
}
