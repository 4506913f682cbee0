//! Client connection configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::ClientOptions;
use crate::domain::channel::ChannelName;
use crate::domain::connection::ReconnectPolicy;

/// Upper bound for the reconnect backoff.
const MAX_BACKOFF_MS: u64 = 300_000;

/// Bayeux client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Websocket endpoint (`ws://` or `wss://`)
    pub url: String,

    /// Automatic reconnect attempts before giving up
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Fixed delay before each reconnect attempt, in milliseconds
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,

    /// Time allowed for opening the websocket, in seconds (0 waits indefinitely)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Keep-alive ping period in seconds (0 disables)
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    /// Connection type declared to the server
    #[serde(default = "default_connection_type")]
    pub connection_type: String,

    /// Channels to subscribe to (comma-separated)
    pub channels: Option<String>,
}

impl ClientConfig {
    /// Get configured channels as a vector
    pub fn channels_list(&self) -> Vec<String> {
        self.channels
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: self.max_reconnect_attempts,
            backoff: Duration::from_millis(self.reconnect_backoff_ms),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// Validate client configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("CLIENT__URL"));
        }
        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(ValidationError::InvalidServerUrl);
        }
        if self.max_reconnect_attempts == 0 {
            return Err(ValidationError::InvalidReconnectAttempts);
        }
        if self.reconnect_backoff_ms == 0 || self.reconnect_backoff_ms > MAX_BACKOFF_MS {
            return Err(ValidationError::InvalidReconnectBackoff);
        }
        if self.connection_type.trim().is_empty() {
            return Err(ValidationError::InvalidConnectionType);
        }
        for channel in self.channels_list() {
            match ChannelName::parse(&channel) {
                Ok(name) if !name.is_empty() && !name.is_meta() => {}
                _ => return Err(ValidationError::InvalidChannel(channel)),
            }
        }
        Ok(())
    }
}

impl From<&ClientConfig> for ClientOptions {
    fn from(config: &ClientConfig) -> Self {
        ClientOptions {
            reconnect: config.reconnect_policy(),
            connect_timeout: config.connect_timeout(),
            heartbeat_interval: config.heartbeat_interval(),
            connection_type: config.connection_type.clone(),
            auto_connect: true,
        }
    }
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_backoff_ms() -> u64 {
    2000
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_heartbeat_interval_secs() -> u64 {
    30
}

fn default_connection_type() -> String {
    "websocket".to_string()
}
