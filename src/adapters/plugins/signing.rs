//! HMAC signing of subscription requests.
//!
//! Servers that authorize subscriptions per channel expect the
//! `/meta/subscribe` ext to carry the caller's api key and an
//! HMAC-SHA256 of the subscription channel, keyed with a shared secret:
//!
//! ```text
//! ext.api_key   = <api key>
//! ext.signature = hex(HMAC-SHA256(secret, "/feed/user1"))
//! ```

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sha2::Sha256;

use crate::domain::channel::ChannelName;
use crate::domain::message::{Message, MetaChannel};
use crate::ports::OutgoingPlugin;

type HmacSha256 = Hmac<Sha256>;

/// Ext key holding the api key.
pub const API_KEY_FIELD: &str = "api_key";

/// Ext key holding the signature.
pub const SIGNATURE_FIELD: &str = "signature";

/// Signs `/meta/subscribe` messages. Other messages pass through.
///
/// A signature supplied by the caller in the subscription's ext fields
/// is left alone.
pub struct SigningPlugin {
    api_key: String,
    secret: SecretString,
}

impl SigningPlugin {
    pub fn new(api_key: impl Into<String>, secret: SecretString) -> Self {
        Self {
            api_key: api_key.into(),
            secret,
        }
    }

    /// Computes the hex signature for `channel`.
    pub fn sign(&self, channel: &ChannelName) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key");
        mac.update(channel.as_str().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl OutgoingPlugin for SigningPlugin {
    fn outgoing(&self, mut message: Message) -> Message {
        if message.meta_channel() != Some(MetaChannel::Subscribe) {
            return message;
        }
        let Some(subscription) = message.subscription.clone() else {
            return message;
        };

        message
            .ext
            .entry(API_KEY_FIELD.to_string())
            .or_insert_with(|| Value::String(self.api_key.clone()));
        if !message.ext.contains_key(SIGNATURE_FIELD) {
            let signature = self.sign(&subscription);
            message
                .ext
                .insert(SIGNATURE_FIELD.to_string(), Value::String(signature));
        }
        message
    }

    fn name(&self) -> &'static str {
        "SigningPlugin"
    }
}
