//! Subscription signing configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::SigningPlugin;

/// Credentials for signing `/meta/subscribe` messages
#[derive(Debug, Clone, Deserialize)]
pub struct SigningConfig {
    /// Api key sent alongside each signature
    pub api_key: String,

    /// Shared HMAC secret
    pub secret: SecretString,
}

impl SigningConfig {
    pub fn plugin(&self) -> SigningPlugin {
        SigningPlugin::new(self.api_key.clone(), self.secret.clone())
    }

    /// Validate signing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("SIGNING__API_KEY"));
        }
        if self.secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("SIGNING__SECRET"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        let config = SigningConfig {
            api_key: "key".to_string(),
            secret: SecretString::new(String::new()),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = SigningConfig {
            api_key: "key".to_string(),
            secret: SecretString::new("hunter2".to_string()),
        };
        assert!(config.validate().is_ok());
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
