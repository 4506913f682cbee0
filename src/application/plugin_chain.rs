//! Ordered outgoing plugin pipeline.

use std::sync::Arc;

use crate::domain::message::Message;
use crate::ports::OutgoingPlugin;

/// Applies registered plugins in registration order. Each plugin sees the
/// output of the previous one.
#[derive(Clone, Default)]
pub struct PluginChain {
    plugins: Vec<Arc<dyn OutgoingPlugin>>,
}

impl PluginChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, plugin: Arc<dyn OutgoingPlugin>) {
        tracing::debug!(plugin = plugin.name(), "Registered outgoing plugin");
        self.plugins.push(plugin);
    }

    pub fn apply(&self, message: Message) -> Message {
        self.plugins
            .iter()
            .fold(message, |message, plugin| plugin.outgoing(message))
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::MessageFactory;
    use serde_json::{json, Value};

    struct Append(&'static str);

    impl OutgoingPlugin for Append {
        fn outgoing(&self, mut message: Message) -> Message {
            let trail = match message.ext.remove("trail") {
                Some(Value::String(s)) => format!("{}{}", s, self.0),
                _ => self.0.to_string(),
            };
            message.ext.insert("trail".to_string(), json!(trail));
            message
        }

        fn name(&self) -> &'static str {
            "Append"
        }
    }

    #[test]
    fn empty_chain_is_identity() {
        let message = MessageFactory::new("websocket").handshake();
        assert_eq!(PluginChain::new().apply(message.clone()), message);
    }

    #[test]
    fn plugins_run_in_registration_order() {
        let mut chain = PluginChain::new();
        chain.push(Arc::new(Append("a")));
        chain.push(Arc::new(Append("b")));
        chain.push(Arc::new(Append("c")));

        let message = chain.apply(MessageFactory::new("websocket").handshake());

        assert_eq!(chain.len(), 3);
        assert_eq!(message.ext.get("trail"), Some(&json!("abc")));
    }
}
