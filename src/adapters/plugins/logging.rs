//! Outgoing message tracing.

use crate::domain::message::Message;
use crate::ports::OutgoingPlugin;

/// Traces every outgoing message at debug level. Never modifies it.
#[derive(Debug, Default)]
pub struct LoggingPlugin;

impl LoggingPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl OutgoingPlugin for LoggingPlugin {
    fn outgoing(&self, message: Message) -> Message {
        tracing::debug!(
            id = ?message.id.as_ref().map(|id| id.as_str()),
            channel = %message.channel,
            subscription = ?message.subscription.as_ref().map(|s| s.as_str()),
            client_id = ?message.client_id.as_ref().map(|c| c.as_str()),
            "Outgoing message"
        );
        message
    }

    fn name(&self) -> &'static str {
        "LoggingPlugin"
    }
}
