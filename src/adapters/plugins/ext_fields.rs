//! Static ext fields added to outgoing messages.

use serde_json::Value;

use crate::domain::message::{Ext, Message, MetaChannel};
use crate::ports::OutgoingPlugin;

/// Adds fixed `ext` fields to outgoing messages, optionally only on some
/// control channels. Fields already set on the message win.
pub struct ExtFieldsPlugin {
    fields: Ext,
    only: Option<Vec<MetaChannel>>,
}

impl ExtFieldsPlugin {
    /// Applies `fields` to every outgoing message.
    pub fn new(fields: Ext) -> Self {
        Self { fields, only: None }
    }

    /// Convenience constructor from string pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self::new(fields)
    }

    /// Restricts the plugin to messages on the given control channels.
    pub fn only_on(mut self, channels: impl IntoIterator<Item = MetaChannel>) -> Self {
        self.only = Some(channels.into_iter().collect());
        self
    }

    fn applies_to(&self, message: &Message) -> bool {
        match &self.only {
            None => true,
            Some(channels) => message
                .meta_channel()
                .map(|meta| channels.contains(&meta))
                .unwrap_or(false),
        }
    }
}

impl OutgoingPlugin for ExtFieldsPlugin {
    fn outgoing(&self, mut message: Message) -> Message {
        if self.applies_to(&message) {
            for (key, value) in &self.fields {
                message
                    .ext
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        message
    }

    fn name(&self) -> &'static str {
        "ExtFieldsPlugin"
    }
}
