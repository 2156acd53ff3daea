//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

use crate::messages::Locale;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub storage_path: PathBuf,
    pub log_level: Level,
    pub locale: Locale,
    pub autosave_interval: Duration,
    pub probe_interval: Duration,
    pub probe_hide_after: Duration,
    pub leaderboard_ttl: Duration,
    pub leaderboard_limit: usize,
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

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- API and Storage Settings ---
        let api_base_url = lookup("API_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000/api".to_string())
            .trim_end_matches('/')
            .to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }

        let storage_path = lookup("STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./finance_empire_storage.json"));

        // --- Logging and Presentation ---
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let locale = match lookup("LOCALE") {
            Some(raw) => raw
                .parse::<Locale>()
                .map_err(|e| ConfigError::InvalidValue("LOCALE".to_string(), e))?,
            None => Locale::default(),
        };

        // --- Timers and Cache ---
        let autosave_interval = secs(&lookup, "AUTOSAVE_INTERVAL_SECS", 30)?;
        let probe_interval = secs(&lookup, "PROBE_INTERVAL_SECS", 60)?;
        let probe_hide_after = secs(&lookup, "PROBE_HIDE_AFTER_SECS", 3)?;
        let leaderboard_ttl = secs(&lookup, "LEADERBOARD_TTL_SECS", 300)?;
        let leaderboard_limit = parsed(&lookup, "LEADERBOARD_LIMIT", 100usize)?;

        Ok(Self {
            api_base_url,
            storage_path,
            log_level,
            locale,
            autosave_interval,
            probe_interval,
            probe_hide_after,
            leaderboard_ttl,
            leaderboard_limit,
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Reads a positive number of seconds. Zero would make `tokio::time::interval` panic.
fn secs<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parsed(lookup, key, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(value))
}
