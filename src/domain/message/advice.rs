//! Server-supplied reconnection advice.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the server wants the client to do after a connection problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reconnect {
    /// Stop; do not reconnect automatically.
    None,
    /// Perform a fresh handshake right away.
    Handshake,
    /// Reconnect after the usual backoff.
    #[default]
    Retry,
}

/// Advice carried by `/meta/handshake` and `/meta/connect` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Advice {
    #[serde(default)]
    pub reconnect: Reconnect,

    /// Delay in milliseconds before the next `/meta/connect`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,

    /// Milliseconds the server will hold a `/meta/connect` open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Advice {
    pub fn new(reconnect: Reconnect) -> Self {
        Self {
            reconnect,
            interval: None,
            timeout: None,
        }
    }

    /// The advised interval, zero when absent.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_full_advice() {
        let advice: Advice =
            serde_json::from_str(r#"{"reconnect":"retry","interval":0,"timeout":60}"#).unwrap();
        assert_eq!(advice.reconnect, Reconnect::Retry);
        assert_eq!(advice.interval, Some(0));
        assert_eq!(advice.timeout, Some(60));
    }

    #[test]
    fn reconnect_defaults_to_retry() {
        let advice: Advice = serde_json::from_str(r#"{"interval":1000}"#).unwrap();
        assert_eq!(advice.reconnect, Reconnect::Retry);
        assert_eq!(advice.interval(), Duration::from_secs(1));
    }

    #[test]
    fn reconnect_values_are_lowercase() {
        let none: Reconnect = serde_json::from_str(r#""none""#).unwrap();
        let handshake: Reconnect = serde_json::from_str(r#""handshake""#).unwrap();
        assert_eq!(none, Reconnect::None);
        assert_eq!(handshake, Reconnect::Handshake);
    }

    #[test]
    fn unknown_reconnect_value_is_rejected() {
        assert!(serde_json::from_str::<Advice>(r#"{"reconnect":"later"}"#).is_err());
    }
}
