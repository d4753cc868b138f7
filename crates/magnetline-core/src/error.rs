//! Core error types for magnetline-core.
//!
//! Reflow itself never fails: a day that cannot be fully covered is a
//! degraded result reported through [`crate::timeline::validate`]. The
//! errors here cover malformed input and configuration I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for magnetline-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors for operation parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Durations are whole minutes and at least one minute long
    #[error("Invalid duration for '{id}': {minutes} minutes (must be at least 1)")]
    InvalidDuration { id: String, minutes: i64 },

    /// A minute offset outside the day
    #[error("Minute {minutes} is outside the day (expected {min}..{max})")]
    MinuteOutOfRange { minutes: i64, min: i64, max: i64 },

    /// Unparseable `HH:MM` clock string
    #[error("Invalid clock time '{0}' (expected HH:MM)")]
    InvalidClock(String),

    /// A new item needs an owner and none could be inferred from the day
    #[error("No owner given and the day has no items to take one from")]
    MissingOwner,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// No such configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
