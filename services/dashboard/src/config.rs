//! services/dashboard/src/config.rs
//!
//! Defines the dashboard's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Backend origin without a trailing slash, e.g. `http://127.0.0.1:5001`.
    pub api_base: String,
    /// Student id used when the schedule is refreshed with an empty field.
    pub default_student_id: String,
    pub chat_history_limit: usize,
    /// Number of chat lines kept for display.
    pub chat_display_limit: usize,
    /// Upper bound on any single backend call.
    pub request_timeout: Duration,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            api_base: "http://127.0.0.1:5001".to_string(),
            default_student_id: "SV001".to_string(),
            chat_history_limit: 20,
            chat_display_limit: 100,
            request_timeout: Duration::from_secs(30),
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_address = match lookup("BIND_ADDRESS") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            None => defaults.bind_address,
        };

        let api_base = match lookup("API_BASE") {
            Some(raw) => {
                let trimmed = raw.trim().trim_end_matches('/').to_string();
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(ConfigError::InvalidValue(
                        "API_BASE".to_string(),
                        format!("'{}' is not an http(s) origin", raw),
                    ));
                }
                trimmed
            }
            None => defaults.api_base,
        };

        let default_student_id = lookup("DEFAULT_STUDENT_ID")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.default_student_id);

        let chat_history_limit =
            positive(&lookup, "CHAT_HISTORY_LIMIT")?.unwrap_or(defaults.chat_history_limit);
        let chat_display_limit =
            positive(&lookup, "CHAT_DISPLAY_LIMIT")?.unwrap_or(defaults.chat_display_limit);
        let request_timeout = positive(&lookup, "REQUEST_TIMEOUT_SECS")?
            .map(|secs| Duration::from_secs(secs as u64))
            .unwrap_or(defaults.request_timeout);

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            api_base,
            default_student_id,
            chat_history_limit,
            chat_display_limit,
            request_timeout,
            log_level,
        })
    }
}

/// Reads `key` as an integer of at least 1. `None` when unset.
fn positive<F>(lookup: &F, key: &str) -> Result<Option<usize>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(ConfigError::InvalidValue(
                key.to_string(),
                format!("'{}' is not a positive integer", raw),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:5001");
        assert_eq!(config.default_student_id, "SV001");
        assert_eq!(config.chat_history_limit, 20);
        assert_eq!(config.chat_display_limit, 100);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn api_base_loses_trailing_slash() {
        let config = Config::from_lookup(lookup(&[("API_BASE", "http://localhost:5000/")])).unwrap();
        assert_eq!(config.api_base, "http://localhost:5000");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("CHAT_HISTORY_LIMIT", "0")])),
            Err(ConfigError::InvalidValue(key, _)) if key == "CHAT_HISTORY_LIMIT"
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("API_BASE", "localhost:5000")])),
            Err(ConfigError::InvalidValue(key, _)) if key == "API_BASE"
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("CHAT_DISPLAY_LIMIT", "-4")])),
            Err(ConfigError::InvalidValue(key, _)) if key == "CHAT_DISPLAY_LIMIT"
        ));
        assert!(Config::from_lookup(lookup(&[("RUST_LOG", "loud")])).is_err());
    }

    #[test]
    fn reads_limits_and_timeout() {
        let config = Config::from_lookup(lookup(&[
            ("CHAT_DISPLAY_LIMIT", "40"),
            ("REQUEST_TIMEOUT_SECS", " 5 "),
        ]))
        .unwrap();
        assert_eq!(config.chat_display_limit, 40);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_student_id_keeps_default() {
        let config = Config::from_lookup(lookup(&[("DEFAULT_STUDENT_ID", "  ")])).unwrap();
        assert_eq!(config.default_student_id, "SV001");
    }
}
