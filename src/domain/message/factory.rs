//! Construction of the Bayeux control messages.

use super::envelope::{Ext, Message, MetaChannel};
use crate::domain::channel::ChannelName;
use crate::domain::foundation::{ClientId, FayeError, MessageIdGenerator};

/// Bayeux protocol version negotiated in every handshake.
pub const BAYEUX_VERSION: &str = "1.0";

/// Builds outgoing control messages and stamps each with a fresh id.
///
/// Every message except the handshake needs the server-assigned
/// `clientId`; asking for one without it fails with
/// `FayeError::ClientIdMissing` instead of producing an invalid frame.
#[derive(Debug)]
pub struct MessageFactory {
    ids: MessageIdGenerator,
    connection_type: String,
}

impl MessageFactory {
    pub fn new(connection_type: impl Into<String>) -> Self {
        Self {
            ids: MessageIdGenerator::new(),
            connection_type: connection_type.into(),
        }
    }

    pub fn connection_type(&self) -> &str {
        &self.connection_type
    }

    /// `/meta/handshake`: negotiates version and connection types.
    pub fn handshake(&mut self) -> Message {
        let mut message = self.base(MetaChannel::Handshake, None);
        message.version = Some(BAYEUX_VERSION.to_string());
        message.minimum_version = Some(BAYEUX_VERSION.to_string());
        message.supported_connection_types = Some(vec![self.connection_type.clone()]);
        message
    }

    /// `/meta/connect`.
    pub fn connect(&mut self, client_id: Option<&ClientId>) -> Result<Message, FayeError> {
        let client_id = require_client_id(MetaChannel::Connect, client_id)?;
        let mut message = self.base(MetaChannel::Connect, Some(client_id));
        message.connection_type = Some(self.connection_type.clone());
        Ok(message)
    }

    /// `/meta/subscribe` for `channel`, carrying the subscription's ext fields.
    pub fn subscribe(
        &mut self,
        client_id: Option<&ClientId>,
        channel: &ChannelName,
        ext: &Ext,
    ) -> Result<Message, FayeError> {
        self.subscription_message(MetaChannel::Subscribe, client_id, channel, ext)
    }

    /// `/meta/unsubscribe` for `channel`.
    pub fn unsubscribe(
        &mut self,
        client_id: Option<&ClientId>,
        channel: &ChannelName,
        ext: &Ext,
    ) -> Result<Message, FayeError> {
        self.subscription_message(MetaChannel::Unsubscribe, client_id, channel, ext)
    }

    /// `/meta/disconnect`.
    pub fn disconnect(&mut self, client_id: Option<&ClientId>) -> Result<Message, FayeError> {
        let client_id = require_client_id(MetaChannel::Disconnect, client_id)?;
        Ok(self.base(MetaChannel::Disconnect, Some(client_id)))
    }

    fn subscription_message(
        &mut self,
        meta: MetaChannel,
        client_id: Option<&ClientId>,
        channel: &ChannelName,
        ext: &Ext,
    ) -> Result<Message, FayeError> {
        let client_id = require_client_id(meta, client_id)?;
        let mut message = self.base(meta, Some(client_id));
        message.subscription = Some(channel.clone());
        message.ext = ext.clone();
        Ok(message)
    }

    fn base(&mut self, meta: MetaChannel, client_id: Option<&ClientId>) -> Message {
        let mut message = Message::new(meta.channel_name());
        message.id = Some(self.ids.next_id());
        message.client_id = client_id.cloned();
        message
    }
}

fn require_client_id(
    meta: MetaChannel,
    client_id: Option<&ClientId>,
) -> Result<&ClientId, FayeError> {
    client_id.ok_or_else(|| FayeError::ClientIdMissing {
        channel: meta.channel_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn factory() -> MessageFactory {
        MessageFactory::new("websocket")
    }

    #[test]
    fn handshake_needs_no_client_id() {
        let message = factory().handshake();

        assert_eq!(message.channel.as_str(), "/meta/handshake");
        assert!(message.client_id.is_none());
        assert_eq!(message.version.as_deref(), Some("1.0"));
        assert_eq!(message.minimum_version.as_deref(), Some("1.0"));
        assert_eq!(
            message.supported_connection_types,
            Some(vec!["websocket".to_string()])
        );
    }

    #[test]
    fn connect_declares_connection_type() {
        let client_id = ClientId::new("c1");
        let message = factory().connect(Some(&client_id)).unwrap();

        assert_eq!(message.channel.as_str(), "/meta/connect");
        assert_eq!(message.client_id, Some(client_id));
        assert_eq!(message.connection_type.as_deref(), Some("websocket"));
    }

    #[test]
    fn connect_without_client_id_fails_fast() {
        let result = factory().connect(None);
        assert_eq!(
            result,
            Err(FayeError::ClientIdMissing {
                channel: "/meta/connect".to_string()
            })
        );
    }

    #[test]
    fn subscribe_carries_subscription_and_ext() {
        let client_id = ClientId::new("c1");
        let channel = ChannelName::parse("/foo/*").unwrap();
        let mut ext = Ext::new();
        ext.insert("signature".to_string(), json!("abc"));

        let message = factory()
            .subscribe(Some(&client_id), &channel, &ext)
            .unwrap();

        assert_eq!(message.channel.as_str(), "/meta/subscribe");
        assert_eq!(message.subscription, Some(channel));
        assert_eq!(message.ext.get("signature"), Some(&json!("abc")));
    }

    #[test]
    fn subscribe_and_unsubscribe_require_client_id() {
        let channel = ChannelName::parse("/foo").unwrap();
        let mut factory = factory();

        assert!(matches!(
            factory.subscribe(None, &channel, &Ext::new()),
            Err(FayeError::ClientIdMissing { .. })
        ));
        assert!(matches!(
            factory.unsubscribe(None, &channel, &Ext::new()),
            Err(FayeError::ClientIdMissing { .. })
        ));
        assert!(matches!(
            factory.disconnect(None),
            Err(FayeError::ClientIdMissing { .. })
        ));
    }

    #[test]
    fn every_message_gets_a_new_id() {
        let client_id = ClientId::new("c1");
        let mut factory = factory();

        let first = factory.handshake();
        let second = factory.connect(Some(&client_id)).unwrap();
        let third = factory.handshake();

        assert_eq!(first.id.unwrap().as_str(), "1");
        assert_eq!(second.id.unwrap().as_str(), "2");
        assert_eq!(third.id.unwrap().as_str(), "3");
    }
}
