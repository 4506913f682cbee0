//! MessageHandler port - Delivery target of a subscription.

use crate::domain::channel::ChannelName;

/// Error a handler may report for one delivery.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Receives the raw `data` payload of messages matching a subscription.
///
/// Implementations should be:
/// - **Quick** - delivery runs on the connection task
/// - **Isolated** - an error or panic is logged and does not affect other
///   subscriptions in the same dispatch
///
/// Plain closures taking `&[u8]` are handlers too:
///
/// ```ignore
/// client.subscribe("/foo/*", Ext::new(), |payload: &[u8]| {
///     println!("{}", String::from_utf8_lossy(payload));
/// }).await?;
/// ```
pub trait MessageHandler: Send + Sync {
    /// Handles one payload delivered on `channel`.
    fn handle(&self, channel: &ChannelName, payload: &[u8]) -> Result<(), HandlerError>;
}

impl<F> MessageHandler for F
where
    F: Fn(&[u8]) + Send + Sync,
{
    fn handle(&self, _channel: &ChannelName, payload: &[u8]) -> Result<(), HandlerError> {
        self(payload);
        Ok(())
    }
}
