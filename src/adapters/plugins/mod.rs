//! Outgoing message plugins.
//!
//! - `ExtFieldsPlugin` - static ext fields (api keys, user ids)
//! - `LoggingPlugin` - traces every outgoing message
//! - `SigningPlugin` - HMAC signature on `/meta/subscribe`

mod ext_fields;
mod logging;
mod signing;

pub use ext_fields::ExtFieldsPlugin;
pub use logging::LoggingPlugin;
pub use signing::{SigningPlugin, API_KEY_FIELD, SIGNATURE_FIELD};
