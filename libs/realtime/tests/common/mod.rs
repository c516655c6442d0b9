//! Common test utilities for realtime integration tests
//!
//! - `MockConnector`: in-memory transport with scripted handshake outcomes
//! - `MockWsServer`: a real tokio-tungstenite server on localhost
//! - `Recorder`: collects subscriber callbacks in order

#![allow(dead_code)]

use async_trait::async_trait;
use crossbeam_channel::{unbounded, Receiver, Sender};
use realtime::{Connector, RealtimeError, Result, Subscribers, Transport, WsMessage};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Notify};

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Let spawned tasks run without advancing the (paused) clock
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// In-memory connector
// =============================================================================

/// What the next handshake does
#[derive(Debug, Clone, Copy)]
pub enum Handshake {
    Refuse,
    Accept,
    /// Never completes
    Hang,
}

/// Server side of an accepted in-memory connection
pub struct MockPeer {
    inbound: Option<mpsc::UnboundedSender<Result<WsMessage>>>,
    writes: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl MockPeer {
    /// Deliver a text frame to the client
    pub fn push(&self, text: &str) {
        if let Some(tx) = &self.inbound {
            let _ = tx.send(Ok(WsMessage::Text(text.to_string())));
        }
    }

    pub fn push_binary(&self, data: &[u8]) {
        if let Some(tx) = &self.inbound {
            let _ = tx.send(Ok(WsMessage::Binary(data.to_vec())));
        }
    }

    /// Fail the connection with a transport error
    pub fn fail(&self) {
        if let Some(tx) = &self.inbound {
            let _ = tx.send(Err(RealtimeError::WebSocket("connection reset".into())));
        }
    }

    /// Close from the server side
    pub fn close(&mut self) {
        self.inbound = None;
    }

    /// Frames the client wrote
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    /// Whether the client closed its end
    pub fn client_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

struct MockTransport {
    inbound: mpsc::UnboundedReceiver<Result<WsMessage>>,
    writes: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn recv(&mut self) -> Option<Result<WsMessage>> {
        self.inbound.recv().await
    }

    async fn send(&mut self, message: WsMessage) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RealtimeError::ConnectionClosed("write after close".into()));
        }
        if let Some(text) = message.as_text() {
            self.writes.lock().unwrap().push(text.to_string());
        }
        Ok(())
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Scripted connector that counts handshake attempts
#[derive(Clone)]
pub struct MockConnector {
    attempts: Arc<AtomicUsize>,
    script: Arc<Mutex<VecDeque<Handshake>>>,
    fallback: Handshake,
    peers_tx: Sender<MockPeer>,
    peers_rx: Receiver<MockPeer>,
}

impl MockConnector {
    /// Every attempt gets `fallback` once the script runs out
    pub fn new(fallback: Handshake) -> Self {
        let (peers_tx, peers_rx) = unbounded();
        Self {
            attempts: Arc::new(AtomicUsize::new(0)),
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            peers_tx,
            peers_rx,
        }
    }

    /// Endpoint that is never reachable
    pub fn unreachable() -> Self {
        Self::new(Handshake::Refuse)
    }

    /// Endpoint that always accepts
    pub fn accepting() -> Self {
        Self::new(Handshake::Accept)
    }

    pub fn then(self, step: Handshake) -> Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Acquire)
    }

    /// The most recently accepted connection, if any since the last call
    pub fn next_peer(&self) -> Option<MockPeer> {
        self.peers_rx.try_recv().ok()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _url: &str) -> Result<Box<dyn Transport>> {
        self.attempts.fetch_add(1, Ordering::AcqRel);
        let step = self.script.lock().unwrap().pop_front().unwrap_or(self.fallback);

        match step {
            Handshake::Refuse => Err(RealtimeError::WebSocket("connection refused".into())),
            Handshake::Hang => std::future::pending().await,
            Handshake::Accept => {
                let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
                let writes = Arc::new(Mutex::new(Vec::new()));
                let closed = Arc::new(AtomicBool::new(false));
                let _ = self.peers_tx.send(MockPeer {
                    inbound: Some(inbound_tx),
                    writes: Arc::clone(&writes),
                    closed: Arc::clone(&closed),
                });
                Ok(Box::new(MockTransport {
                    inbound: inbound_rx,
                    writes,
                    closed,
                }))
            }
        }
    }
}

// =============================================================================
// Callback recorder
// =============================================================================

/// One observed callback invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Seen {
    Message(serde_json::Value),
    Notification(serde_json::Value),
    Online(String),
    Offline(String),
}

/// Subscribers wired to a crossbeam channel
pub struct Recorder {
    rx: Receiver<Seen>,
}

impl Recorder {
    pub fn new() -> (Self, Subscribers) {
        let (tx, rx) = unbounded();
        let (t1, t2, t3, t4) = (tx.clone(), tx.clone(), tx.clone(), tx);
        let subscribers = Subscribers::new()
            .on_message(move |m| {
                let _ = t1.send(Seen::Message(m));
            })
            .on_notification(move |n| {
                let _ = t2.send(Seen::Notification(n));
            })
            .on_user_online(move |u| {
                let _ = t3.send(Seen::Online(u));
            })
            .on_user_offline(move |u| {
                let _ = t4.send(Seen::Offline(u));
            });
        (Self { rx }, subscribers)
    }

    /// Everything seen so far
    pub fn drain(&self) -> Vec<Seen> {
        self.rx.try_iter().collect()
    }

    /// Block (real time) for the next invocation
    pub fn wait(&self, timeout: Duration) -> Option<Seen> {
        self.rx.recv_timeout(timeout).ok()
    }
}

// =============================================================================
// Real WebSocket server
// =============================================================================

/// A mock WebSocket server for end-to-end tests
///
/// Each accepted connection is handed a script of frames to send, then
/// echoes nothing and records what the client writes.
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    received_rx: Receiver<String>,
    headers_rx: Receiver<Vec<(String, String)>>,
    connections: Arc<AtomicUsize>,
    kick: Arc<Notify>,
}

impl MockWsServer {
    /// Start a server that sends `frames` to every client after the handshake
    pub async fn start(frames: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let kick = Arc::new(Notify::new());
        let connections = Arc::new(AtomicUsize::new(0));
        let (received_tx, received_rx) = unbounded();
        let (headers_tx, headers_rx) = unbounded();

        let shutdown_clone = shutdown.clone();
        let kick_clone = kick.clone();
        let connections_clone = connections.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                connections_clone.fetch_add(1, Ordering::AcqRel);
                                let shutdown = shutdown_clone.clone();
                                let kick = kick_clone.clone();
                                let frames = frames.clone();
                                let received_tx = received_tx.clone();
                                let headers_tx = headers_tx.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(
                                        stream,
                                        frames,
                                        received_tx,
                                        headers_tx,
                                        shutdown,
                                        kick,
                                    )
                                    .await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown,
            received_rx,
            headers_rx,
            connections,
            kick,
        }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        frames: Vec<String>,
        received_tx: Sender<String>,
        headers_tx: Sender<Vec<(String, String)>>,
        shutdown: Arc<Notify>,
        kick: Arc<Notify>,
    ) {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::accept_hdr_async;
        use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
        use tokio_tungstenite::tungstenite::Message;

        let capture = move |request: &Request, response: Response| {
            let headers = request
                .headers()
                .iter()
                .map(|(name, value)| {
                    (name.as_str().to_string(), value.to_str().unwrap_or_default().to_string())
                })
                .collect();
            let _ = headers_tx.send(headers);
            Ok::<Response, ErrorResponse>(response)
        };

        let ws_stream = match accept_hdr_async(stream, capture).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        for frame in frames {
            if write.send(Message::Text(frame)).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let _ = received_tx.send(text);
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
                _ = kick.notified() => {
                    // Drop the connection without a close handshake
                    break;
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Number of accepted TCP connections so far
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::Acquire)
    }

    /// Drop every open connection
    pub fn kick_all(&self) {
        self.kick.notify_waiters();
    }

    /// Wait (real time) for the next text frame written by a client
    pub fn next_received(&self, timeout: Duration) -> Option<String> {
        self.received_rx.recv_timeout(timeout).ok()
    }

    /// Wait (real time) for the headers of the next handshake
    pub fn next_handshake_headers(&self, timeout: Duration) -> Option<Vec<(String, String)>> {
        self.headers_rx.recv_timeout(timeout).ok()
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
