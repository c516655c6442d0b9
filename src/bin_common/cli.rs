//! CLI utilities for binaries
//!
//! Resolves where the configuration file lives.

use std::path::PathBuf;

/// Environment variable that overrides the config location
pub const CONFIG_PATH_ENV: &str = "REALTIME_CONFIG_PATH";

/// Used when `REALTIME_CONFIG_PATH` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/realtime.yaml";

/// Load configuration path from environment or use default
///
/// A first positional argument wins over both.
pub fn load_config_from_env() -> PathBuf {
    config_path_from(parse_args().first().cloned(), std::env::var(CONFIG_PATH_ENV).ok())
}

fn config_path_from(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.filter(|a| !a.starts_with('-'))
        .or(env)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
        .into()
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        assert_eq!(config_path_from(None, None), PathBuf::from("config/realtime.yaml"));
    }

    #[test]
    fn test_env_overrides_default() {
        assert_eq!(
            config_path_from(None, Some("/etc/realtime.yaml".to_string())),
            PathBuf::from("/etc/realtime.yaml")
        );
    }

    #[test]
    fn test_argument_overrides_env() {
        assert_eq!(
            config_path_from(
                Some("local.yaml".to_string()),
                Some("/etc/realtime.yaml".to_string())
            ),
            PathBuf::from("local.yaml")
        );
    }

    #[test]
    fn test_flags_are_not_paths() {
        assert_eq!(
            config_path_from(Some("--verbose".to_string()), None),
            PathBuf::from(DEFAULT_CONFIG_PATH)
        );
    }
}
