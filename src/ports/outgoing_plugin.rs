//! OutgoingPlugin port - Transforms applied to every outbound message.

use crate::domain::message::Message;

/// A transform run on each outgoing message before it is serialized.
///
/// Plugins run in registration order and may rewrite any field, but they
/// cannot drop a message: they always hand one back.
///
/// # Example
///
/// ```ignore
/// struct AddToken(String);
///
/// impl OutgoingPlugin for AddToken {
///     fn outgoing(&self, mut message: Message) -> Message {
///         message.ext.insert("token".into(), self.0.clone().into());
///         message
///     }
///
///     fn name(&self) -> &'static str {
///         "AddToken"
///     }
/// }
/// ```
pub trait OutgoingPlugin: Send + Sync {
    fn outgoing(&self, message: Message) -> Message;

    /// Plugin name for logging.
    fn name(&self) -> &'static str;
}
