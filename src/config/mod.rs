//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `FAYE_CLIENT_` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use faye_client::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Connecting to {}", config.client.url);
//! ```

mod client;
mod error;
mod logging;
mod signing;

pub use client::ClientConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use signing::SigningConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bayeux endpoint and connection policy
    pub client: ClientConfig,

    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Subscription signing credentials (optional)
    pub signing: Option<SigningConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `FAYE_CLIENT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `FAYE_CLIENT__CLIENT__URL=wss://...` -> `client.url = ...`
    /// - `FAYE_CLIENT__LOGGING__JSON=true` -> `logging.json = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("FAYE_CLIENT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration and validate it in one step
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadError` if loading fails and
    /// `ConfigError::ValidationFailed` if a value is invalid.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.client.validate()?;
        self.logging.validate()?;
        if let Some(signing) = &self.signing {
            signing.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("FAYE_CLIENT__CLIENT__URL", "wss://faye.example.com/faye");
    }

    fn clear_env() {
        env::remove_var("FAYE_CLIENT__CLIENT__URL");
        env::remove_var("FAYE_CLIENT__CLIENT__MAX_RECONNECT_ATTEMPTS");
        env::remove_var("FAYE_CLIENT__CLIENT__CHANNELS");
        env::remove_var("FAYE_CLIENT__CLIENT__CONNECT_TIMEOUT_SECS");
        env::remove_var("FAYE_CLIENT__LOGGING__JSON");
        env::remove_var("FAYE_CLIENT__SIGNING__API_KEY");
        env::remove_var("FAYE_CLIENT__SIGNING__SECRET");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.client.url, "wss://faye.example.com/faye");
        assert_eq!(config.client.max_reconnect_attempts, 5);
        assert_eq!(config.client.reconnect_backoff_ms, 2000);
        assert!(config.signing.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_url_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("FAYE_CLIENT__CLIENT__MAX_RECONNECT_ATTEMPTS", "3");
        env::set_var("FAYE_CLIENT__CLIENT__CHANNELS", "/feed/*,/news");
        env::set_var("FAYE_CLIENT__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.client.max_reconnect_attempts, 3);
        assert_eq!(config.client.channels_list(), vec!["/feed/*", "/news"]);
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_validated_reports_invalid_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("FAYE_CLIENT__CLIENT__URL", "https://faye.example.com/faye");
        let result = AppConfig::load_validated();
        clear_env();

        assert!(matches!(
            result,
            Err(ConfigError::ValidationFailed(ValidationError::InvalidServerUrl))
        ));
    }

    #[test]
    fn test_load_validated_accepts_valid_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("FAYE_CLIENT__CLIENT__CONNECT_TIMEOUT_SECS", "4");
        let result = AppConfig::load_validated();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.client.connect_timeout_secs, 4);
    }

    #[test]
    fn test_signing_section() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("FAYE_CLIENT__SIGNING__API_KEY", "key-1");
        env::set_var("FAYE_CLIENT__SIGNING__SECRET", "s3cret");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let signing = config.signing.as_ref().expect("signing section");
        assert_eq!(signing.api_key, "key-1");
        assert!(config.validate().is_ok());
    }
}
