//! The Bayeux message envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::advice::Advice;
use crate::domain::channel::ChannelName;
use crate::domain::foundation::{ClientId, MessageId};

/// Free-form `ext` metadata.
pub type Ext = Map<String, Value>;

/// Protocol control channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaChannel {
    Handshake,
    Connect,
    Subscribe,
    Unsubscribe,
    Disconnect,
}

impl MetaChannel {
    const ALL: [MetaChannel; 5] = [
        MetaChannel::Handshake,
        MetaChannel::Connect,
        MetaChannel::Subscribe,
        MetaChannel::Unsubscribe,
        MetaChannel::Disconnect,
    ];

    fn segment(&self) -> &'static str {
        match self {
            MetaChannel::Handshake => "handshake",
            MetaChannel::Connect => "connect",
            MetaChannel::Subscribe => "subscribe",
            MetaChannel::Unsubscribe => "unsubscribe",
            MetaChannel::Disconnect => "disconnect",
        }
    }

    pub fn channel_name(&self) -> ChannelName {
        ChannelName::meta(self.segment())
    }

    /// Classifies a channel, `None` for application channels and unknown
    /// `/meta/` channels.
    pub fn from_channel(channel: &ChannelName) -> Option<Self> {
        let segment = channel.as_str().strip_prefix(ChannelName::META_PREFIX)?;
        Self::ALL.into_iter().find(|meta| meta.segment() == segment)
    }
}

/// One Bayeux envelope, as sent or received.
///
/// `data` is deliberately absent: the protocol layer never inspects
/// payloads and forwards them from the raw decoded JSON instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,

    pub channel: ChannelName,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<ChannelName>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub ext: Ext,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<Advice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_connection_types: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
}

impl Message {
    /// Creates a bare envelope on `channel`.
    pub fn new(channel: ChannelName) -> Self {
        Self {
            id: None,
            client_id: None,
            channel,
            subscription: None,
            ext: Ext::new(),
            successful: None,
            advice: None,
            error: None,
            version: None,
            minimum_version: None,
            supported_connection_types: None,
            connection_type: None,
        }
    }

    pub fn meta_channel(&self) -> Option<MetaChannel> {
        MetaChannel::from_channel(&self.channel)
    }

    /// True unless the server explicitly reported failure.
    pub fn is_successful(&self) -> bool {
        self.successful.unwrap_or(true)
    }
}
