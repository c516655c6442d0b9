//! Tail the realtime channel
//!
//! Connects to the social network's realtime endpoint, logs every event it
//! receives and forwards each JSON line read from stdin as an outbound
//! payload. Reconnects on its own until Ctrl+C.
//!
//! Usage:
//!   cargo run --bin realtime_tail [config/realtime.yaml]
//!
//! Optional environment variables:
//!   REALTIME_CONFIG_PATH - config file location
//!   WS_URL, RECONNECT_DELAY_MS, CONNECT_TIMEOUT_MS, LOG_LEVEL - overrides
//!   WS_AUTH_TOKEN - sent as a bearer token on every handshake

use anyhow::{Context, Result};
use serde_json::Value;
use social_realtime::bin_common::{init_tracing, load_config_from_env, ShutdownManager};
use social_realtime::config::RealtimeConfig;
use social_realtime::realtime::Subscribers;
use social_realtime::social_types::{FromPayload, Message, Notification, PresenceUpdate};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

fn subscribers() -> Subscribers {
    Subscribers::new()
        .on_message(|payload| match Message::from_payload(payload.clone()) {
            Ok(message) => info!(
                conversation = %message.conversation_id,
                sender = %message
                    .sender
                    .as_ref()
                    .map(|u| u.display_name())
                    .unwrap_or(message.sender_id.clone()),
                kind = ?message.kind,
                "💬 {}",
                message.content
            ),
            Err(e) => info!(error = %e, "💬 {}", payload),
        })
        .on_notification(|payload| match Notification::from_payload(payload.clone()) {
            Ok(notification) => info!(
                kind = ?notification.kind,
                read = notification.is_read,
                "🔔 {}: {}",
                notification.title,
                notification.message
            ),
            Err(e) => info!(error = %e, "🔔 {}", payload),
        })
        .on_user_online(|user_id| log_presence(PresenceUpdate::online(user_id)))
        .on_user_offline(|user_id| log_presence(PresenceUpdate::offline(user_id)))
}

fn log_presence(update: PresenceUpdate) {
    let status = if update.online { "online" } else { "offline" };
    info!(user_id = %update.user_id, "👤 {}", status);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv::dotenv().ok();

    let config_path = load_config_from_env();
    let config = RealtimeConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    init_tracing(&config.log_level);
    config.log_summary();

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let channel = config.channel_builder().subscribers(subscribers()).mount();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    info!("Type JSON lines to send them, Ctrl+C to stop");

    while shutdown.is_running() {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match serde_json::from_str::<Value>(&line) {
                    Ok(payload) if channel.is_open() => channel.send(&payload),
                    Ok(_) => warn!(
                        state = ?channel.connection_state(),
                        "Channel not open, payload dropped"
                    ),
                    Err(e) => warn!(error = %e, "Not valid JSON, ignoring line"),
                },
                Ok(None) => {
                    info!("stdin closed, still listening");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin, no longer forwarding");
                    stdin_open = false;
                }
            },
            _ = shutdown.wait() => break,
        }
    }

    channel.shutdown().await;

    let metrics = channel.metrics();
    info!(
        connect_attempts = metrics.connect_attempts,
        reconnects = metrics.reconnect_count,
        frames_received = metrics.frames_received,
        frames_dropped = metrics.frames_dropped,
        messages_sent = metrics.messages_sent,
        "realtime_tail stopped"
    );

    Ok(())
}
