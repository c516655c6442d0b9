//! Social network realtime client
//!
//! Ties the workspace together for binaries:
//!
//! - **realtime**: the reconnecting WebSocket channel (re-exported)
//! - **social_types**: typed views over event payloads (re-exported)
//! - **config**: YAML + environment configuration
//! - **bin_common**: shared setup for binary executables
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use social_realtime::bin_common::{init_tracing, load_config_from_env};
//! use social_realtime::config::RealtimeConfig;
//! ```

// Re-export workspace libraries for convenience
pub use realtime;
pub use social_types;

pub mod config;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod logging;
    pub mod shutdown;

    pub use cli::{load_config_from_env, parse_args, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
    pub use logging::init_tracing;
    pub use shutdown::ShutdownManager;
}
