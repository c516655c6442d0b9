//! Realtime client configuration
//!
//! Loaded from YAML, then overridden by environment variables. Secrets
//! (the auth token) only ever come from the environment.

use realtime::states::{HasUrl, NoSubscribers};
use realtime::{
    ChannelBuilder, FixedDelay, RealtimeChannel, StaticHeaders, DEFAULT_RECONNECT_DELAY,
    DEFAULT_WS_URL,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const ENV_WS_URL: &str = "WS_URL";
pub const ENV_RECONNECT_DELAY_MS: &str = "RECONNECT_DELAY_MS";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "CONNECT_TIMEOUT_MS";
pub const ENV_AUTH_TOKEN: &str = "WS_AUTH_TOKEN";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnvVar { name: String, value: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    pub ws_url: String,
    pub reconnect_delay_ms: u64,
    /// None retries forever
    pub max_reconnect_attempts: Option<usize>,
    /// None waits on a handshake indefinitely
    pub connect_timeout_ms: Option<u64>,
    pub log_level: String,

    /// Bearer token from .env (not in YAML)
    #[serde(skip)]
    pub auth_token: Option<String>,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY.as_millis() as u64,
            max_reconnect_attempts: None,
            connect_timeout_ms: None,
            log_level: "info".to_string(),
            auth_token: None,
        }
    }
}

impl RealtimeConfig {
    /// Load from a YAML file, apply process environment overrides, validate
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config: RealtimeConfig = serde_yaml::from_str(&yaml_content)?;

        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file means defaults
    pub fn load_or_default(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();
        if config_path.exists() {
            return Self::load(config_path);
        }

        warn!(path = %config_path.display(), "Config file not found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `lookup` (normally the process environment)
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_WS_URL) {
            self.ws_url = url;
        }

        if let Some(value) = lookup(ENV_RECONNECT_DELAY_MS) {
            self.reconnect_delay_ms = parse_millis(ENV_RECONNECT_DELAY_MS, &value)?;
        }

        if let Some(value) = lookup(ENV_CONNECT_TIMEOUT_MS) {
            self.connect_timeout_ms = Some(parse_millis(ENV_CONNECT_TIMEOUT_MS, &value)?);
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level.to_ascii_lowercase();
        }

        self.auth_token = lookup(ENV_AUTH_TOKEN).filter(|token| !token.is_empty());

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(ConfigError::ValidationError(format!(
                "ws_url must start with ws:// or wss://, got {:?}",
                self.ws_url
            )));
        }

        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::ValidationError(
                "reconnect_delay_ms must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "connect_timeout_ms must be greater than 0 when set".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of {}, got {:?}",
                LOG_LEVELS.join("/"),
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// A channel builder with URL, reconnect policy, timeout and auth applied.
    /// Only the subscribers are left to the caller.
    pub fn channel_builder(&self) -> ChannelBuilder<HasUrl, NoSubscribers> {
        let strategy = FixedDelay::new(self.reconnect_delay(), self.max_reconnect_attempts);
        let mut builder = RealtimeChannel::builder()
            .url(self.ws_url.clone())
            .reconnect_strategy(strategy);

        if let Some(timeout) = self.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }

        if let Some(token) = &self.auth_token {
            builder = builder.headers(StaticHeaders::bearer(token));
        }

        builder
    }

    /// Log the effective configuration (never the token itself)
    pub fn log_summary(&self) {
        info!("Realtime configuration:");
        info!("  ws_url: {}", self.ws_url);
        info!("  reconnect_delay_ms: {}", self.reconnect_delay_ms);
        match self.max_reconnect_attempts {
            Some(max) => info!("  max_reconnect_attempts: {}", max),
            None => info!("  max_reconnect_attempts: unlimited"),
        }
        match self.connect_timeout_ms {
            Some(ms) => info!("  connect_timeout_ms: {}", ms),
            None => info!("  connect_timeout_ms: none"),
        }
        info!("  log_level: {}", self.log_level);
        info!("  auth_token: {}", if self.auth_token.is_some() { "set" } else { "not set" });
    }
}

fn parse_millis(name: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
        name: name.to_string(),
        value: value.to_string(),
    })
}
