//! Configuration for embedding applications and the admin binary
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Database file location override
pub const DB_PATH_ENV: &str = "CONTENTREE_DB_PATH";
/// Default tracing filter when `RUST_LOG` is unset
pub const LOG_ENV: &str = "CONTENTREE_LOG";
/// Broadcast channel capacity for content events
pub const EVENT_CAPACITY_ENV: &str = "CONTENTREE_EVENT_CAPACITY";

/// Upper bound for the event channel; each slot holds a full record
const MAX_EVENT_CHANNEL_CAPACITY: usize = 65_536;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cannot determine home directory; set CONTENTREE_DB_PATH")]
    NoHomeDirectory,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentreeConfig {
    /// libsql database file
    pub database_path: PathBuf,

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,

    pub event_channel_capacity: usize,
}

impl ContentreeConfig {
    /// Defaults: `~/.contentree/database/contentree.db`, filter `info`, capacity 128
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let home_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(Self::at(
            home_dir
                .join(".contentree")
                .join("database")
                .join("contentree.db"),
        ))
    }

    /// Defaults with an explicit database path
    pub fn at(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            log_filter: "info".to_string(),
            event_channel_capacity: crate::services::DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }

    /// Read `CONTENTREE_*` variables from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source, then validate
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(DB_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            Some(path) => Self::at(path),
            None => Self::with_defaults()?,
        };

        if let Some(filter) = lookup(LOG_ENV).filter(|v| !v.trim().is_empty()) {
            config.log_filter = filter;
        }

        if let Some(raw) = lookup(EVENT_CAPACITY_ENV) {
            config.event_channel_capacity =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        name: EVENT_CAPACITY_ENV,
                        value: raw.clone(),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database_path cannot be empty".to_string()));
        }

        if self.event_channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_channel_capacity must be greater than 0".to_string(),
            ));
        }

        if self.event_channel_capacity > MAX_EVENT_CHANNEL_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "event_channel_capacity cannot exceed {}",
                MAX_EVENT_CHANNEL_CAPACITY
            )));
        }

        Ok(())
    }
}
