//! Public client handle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};

use super::actor::{Command, ConnectionActor};
use super::plugin_chain::PluginChain;
use super::registry::Subscription;
use super::subscription::SubscriptionHandle;
use crate::domain::channel::ChannelName;
use crate::domain::connection::{ConnectionState, ReconnectPolicy};
use crate::domain::foundation::{ClientId, FayeError};
use crate::domain::message::Ext;
use crate::ports::{MessageHandler, OutgoingPlugin, Transport};

/// Tunables for a [`FayeClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Attempt cap and fixed backoff for automatic reconnects.
    pub reconnect: ReconnectPolicy,

    /// Upper bound on a single transport open. Zero waits indefinitely.
    ///
    /// Default: 10 seconds
    pub connect_timeout: Duration,

    /// Keep-alive ping period while the transport is open. Zero disables it.
    ///
    /// Default: 30 seconds
    pub heartbeat_interval: Duration,

    /// Connection type declared in handshake and connect messages.
    ///
    /// Default: "websocket"
    pub connection_type: String,

    /// Whether subscribing while idle or disconnected opens the connection.
    ///
    /// Default: true
    pub auto_connect: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            connect_timeout: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(30),
            connection_type: "websocket".to_string(),
            auto_connect: true,
        }
    }
}

/// Builder for [`FayeClient`].
pub struct FayeClientBuilder {
    transport: Arc<dyn Transport>,
    options: ClientOptions,
    plugins: PluginChain,
}

impl FayeClientBuilder {
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Appends an outgoing plugin. Plugins run in the order they are added.
    pub fn plugin(mut self, plugin: impl OutgoingPlugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Starts the connection task. Must be called within a tokio runtime.
    ///
    /// The client starts idle; nothing is opened until [`FayeClient::connect`]
    /// or a subscription with `auto_connect` enabled.
    pub fn build(self) -> FayeClient {
        let (commands, state) = ConnectionActor::spawn(self.transport, self.options, self.plugins);
        FayeClient { commands, state }
    }
}

/// Bayeux client.
///
/// Cheap to clone; every clone drives the same connection. The connection
/// is torn down once the last clone is dropped.
///
/// # Example
///
/// ```ignore
/// let client = FayeClient::builder(Arc::new(WebSocketTransport::new(url)))
///     .plugin(LoggingPlugin::new())
///     .build();
///
/// let _feed = client
///     .subscribe("/feed/*", Ext::new(), |payload: &[u8]| {
///         println!("{}", String::from_utf8_lossy(payload));
///     })
///     .await?;
/// client.connect().await?;
/// ```
#[derive(Clone)]
pub struct FayeClient {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
}

impl FayeClient {
    pub fn builder(transport: Arc<dyn Transport>) -> FayeClientBuilder {
        FayeClientBuilder {
            transport,
            options: ClientOptions::default(),
            plugins: PluginChain::new(),
        }
    }

    /// Starts connecting and returns without waiting for the transport.
    ///
    /// Opening and the handshake proceed in the background; observe them
    /// with [`FayeClient::state`] or [`FayeClient::wait_for_state`]. A
    /// failed or timed-out open is handled by the reconnect policy and
    /// ends in `Disconnected` once the attempts are used up. A no-op while
    /// already connected or connecting.
    ///
    /// # Errors
    ///
    /// `ClientShutDown` if the connection task is gone.
    pub async fn connect(&self) -> Result<(), FayeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Connect { reply })?;
        rx.await.map_err(|_| FayeError::ClientShutDown)
    }

    /// Tears down the connection and cancels pending reconnects.
    ///
    /// Idempotent. Subscriptions stay registered and are replayed on the
    /// next successful handshake.
    pub async fn disconnect(&self) {
        let (reply, rx) = oneshot::channel();
        if self.send(Command::Disconnect { reply }).is_ok() {
            let _ = rx.await;
        }
    }

    /// Registers `handler` for `channel`, which may end in `*` or `**`.
    ///
    /// While connected a `/meta/subscribe` is sent right away; otherwise the
    /// subscription is sent after the next successful handshake.
    ///
    /// # Errors
    ///
    /// - `InvalidChannelName` for malformed, empty or `/meta/` channels
    /// - `NotConnected` if the transport dropped while sending. The
    ///   registration is kept and replayed on the next handshake, but no
    ///   handle is returned for it: end it with
    ///   [`FayeClient::unsubscribe`] on the same channel name, which also
    ///   removes any other registration for that name
    pub async fn subscribe<H>(
        &self,
        channel: &str,
        ext: Ext,
        handler: H,
    ) -> Result<SubscriptionHandle, FayeError>
    where
        H: MessageHandler + 'static,
    {
        let channel = ChannelName::parse(channel)?;
        if channel.is_empty() || channel.is_meta() {
            return Err(FayeError::InvalidChannelName(channel.to_string()));
        }

        let subscription = Subscription::new(channel.clone(), ext, Arc::new(handler));
        let id = subscription.id;
        let active = subscription.active.clone();

        let (reply, rx) = oneshot::channel();
        self.send(Command::Subscribe {
            subscription,
            reply,
        })?;
        rx.await.map_err(|_| FayeError::ClientShutDown)??;

        Ok(SubscriptionHandle::new(
            id,
            channel,
            active,
            self.commands.downgrade(),
        ))
    }

    /// Removes every registration for `channel`.
    ///
    /// Sends `/meta/unsubscribe` when connected; succeeds silently otherwise.
    pub async fn unsubscribe(&self, channel: &str) -> Result<(), FayeError> {
        let channel = ChannelName::parse(channel)?;
        let (reply, rx) = oneshot::channel();
        self.send(Command::Unsubscribe { channel, reply })?;
        rx.await.map_err(|_| FayeError::ClientShutDown)?
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// A receiver that observes every state change.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Waits until the connection reaches `target`.
    pub async fn wait_for_state(&self, target: ConnectionState) -> Result<(), FayeError> {
        let mut state = self.state.clone();
        state
            .wait_for(|current| *current == target)
            .await
            .map(|_| ())
            .map_err(|_| FayeError::ClientShutDown)
    }

    /// The server-assigned identity, while connected.
    pub async fn client_id(&self) -> Result<Option<ClientId>, FayeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ClientId { reply })?;
        rx.await.map_err(|_| FayeError::ClientShutDown)
    }

    fn send(&self, command: Command) -> Result<(), FayeError> {
        self.commands
            .send(command)
            .map_err(|_| FayeError::ClientShutDown)
    }
}

impl std::fmt::Debug for FayeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FayeClient")
            .field("state", &self.state())
            .finish()
    }
}
