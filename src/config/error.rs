//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Server URL must use ws:// or wss://")]
    InvalidServerUrl,

    #[error("Reconnect attempts must be at least 1")]
    InvalidReconnectAttempts,

    #[error("Reconnect backoff must be between 1ms and 5 minutes")]
    InvalidReconnectBackoff,

    #[error("Connection type must not be empty")]
    InvalidConnectionType,

    #[error("Invalid channel '{0}'")]
    InvalidChannel(String),

    #[error("Invalid log filter directive")]
    InvalidLogLevel,
}
