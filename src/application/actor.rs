//! Connection actor.
//!
//! One task owns every piece of mutable connection state: the clientId,
//! the last advice, the reconnect counter, the subscription registry and
//! the timers. Callers, the transport and the timers all talk to it over
//! channels, so an inbound "handshake succeeded, resubscribe everything"
//! sequence can never interleave with a caller's subscribe or unsubscribe.
//!
//! ```text
//!  FayeClient ──Command──┐
//!  Transport ──(session, TransportEvent)──┼──> ConnectionActor ──frames──> Transport
//!  Timers ──TimerEvent───┘
//! ```
//!
//! Transport events are stamped with the session that opened the
//! transport, and reconnect timers with an epoch bumped by every explicit
//! connect or disconnect. Anything stamped with an older value is stale
//! and ignored.
//!
//! Opening the transport runs on its own task and reports back as a
//! transport event, so a slow or hanging open never blocks the actor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::client::ClientOptions;
use super::heartbeat::Heartbeat;
use super::plugin_chain::PluginChain;
use super::registry::{Subscription, SubscriptionRegistry};
use super::timer::DelayedTask;
use crate::domain::channel::ChannelName;
use crate::domain::connection::{ConnectionState, ReconnectAction, ReconnectTracker};
use crate::domain::foundation::{
    ClientId, FayeError, StateMachine, SubscriptionId, TransportError,
};
use crate::domain::message::{
    codec, Advice, Ext, InboundMessage, Message, MessageFactory, MetaChannel,
};
use crate::ports::{Transport, TransportEvent, TransportEventSink};

/// Requests from the public client handle.
pub(crate) enum Command {
    Connect {
        reply: oneshot::Sender<()>,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
    Subscribe {
        subscription: Subscription,
        reply: oneshot::Sender<Result<(), FayeError>>,
    },
    Unsubscribe {
        channel: ChannelName,
        reply: oneshot::Sender<Result<(), FayeError>>,
    },
    /// A subscription handle was dropped.
    Release { id: SubscriptionId },
    ClientId {
        reply: oneshot::Sender<Option<ClientId>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerEvent {
    ReconnectDue { epoch: u64 },
    ConnectDue { session: u64 },
    HeartbeatTick { session: u64 },
}

pub(crate) struct ConnectionActor {
    transport: Arc<dyn Transport>,
    factory: MessageFactory,
    plugins: PluginChain,
    registry: SubscriptionRegistry,
    tracker: ReconnectTracker,
    heartbeat: Heartbeat,
    reconnect_timer: DelayedTask,
    connect_timer: DelayedTask,
    open_task: Option<JoinHandle<()>>,
    connect_timeout: Duration,
    client_id: Option<ClientId>,
    advice: Option<Advice>,
    poll_interval: Duration,
    transport_live: bool,
    session: u64,
    epoch: u64,
    auto_connect: bool,
    state: watch::Sender<ConnectionState>,
    events_tx: mpsc::UnboundedSender<(u64, TransportEvent)>,
    timers_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl ConnectionActor {
    /// Starts the actor on the current runtime.
    ///
    /// The actor runs until every command sender is dropped, then
    /// disconnects.
    pub(crate) fn spawn(
        transport: Arc<dyn Transport>,
        options: ClientOptions,
        plugins: PluginChain,
    ) -> (
        mpsc::UnboundedSender<Command>,
        watch::Receiver<ConnectionState>,
    ) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (timers_tx, timers_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);

        let actor = Self {
            transport,
            factory: MessageFactory::new(options.connection_type),
            plugins,
            registry: SubscriptionRegistry::new(),
            tracker: ReconnectTracker::new(options.reconnect),
            heartbeat: Heartbeat::new(options.heartbeat_interval),
            reconnect_timer: DelayedTask::new(),
            connect_timer: DelayedTask::new(),
            open_task: None,
            connect_timeout: options.connect_timeout,
            client_id: None,
            advice: None,
            poll_interval: Duration::ZERO,
            transport_live: false,
            session: 0,
            epoch: 0,
            auto_connect: options.auto_connect,
            state: state_tx,
            events_tx,
            timers_tx,
        };
        tokio::spawn(actor.run(commands_rx, events_rx, timers_rx));

        (commands_tx, state_rx)
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<(u64, TransportEvent)>,
        mut timers: mpsc::UnboundedReceiver<TimerEvent>,
    ) {
        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },

                Some((session, event)) = events.recv() => {
                    self.handle_transport_event(session, event).await;
                }

                Some(timer) = timers.recv() => {
                    self.handle_timer(timer).await;
                }
            }
        }

        tracing::debug!("All client handles dropped, shutting down connection");
        self.disconnect().await;
    }

    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn set_state(&mut self, next: ConnectionState) {
        let current = self.state();
        if current == next {
            return;
        }
        if !current.can_transition_to(&next) {
            tracing::warn!(from = %current, to = %next, "Unexpected connection state transition");
        }
        tracing::info!(from = %current, to = %next, "Connection state changed");
        self.state.send_replace(next);
    }

    // === Commands ===

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect { reply } => {
                self.start_connect(true);
                let _ = reply.send(());
            }
            Command::Disconnect { reply } => {
                self.disconnect().await;
                let _ = reply.send(());
            }
            Command::Subscribe {
                subscription,
                reply,
            } => {
                let result = self.subscribe(subscription).await;
                let _ = reply.send(result);
            }
            Command::Unsubscribe { channel, reply } => {
                let result = self.unsubscribe(channel).await;
                let _ = reply.send(result);
            }
            Command::Release { id } => self.release(id).await,
            Command::ClientId { reply } => {
                let _ = reply.send(self.client_id.clone());
            }
        }
    }

    /// Starts opening the transport on a separate task.
    ///
    /// The outcome comes back as an event of the new session: `Opened` from
    /// the transport, or `Error` if the open failed or timed out. The
    /// handshake follows on `Opened`. A no-op while a connection is being
    /// established or is established.
    fn start_connect(&mut self, explicit: bool) {
        let state = self.state();
        if matches!(
            state,
            ConnectionState::Connecting | ConnectionState::Handshaking | ConnectionState::Connected
        ) {
            return;
        }

        if explicit {
            self.epoch += 1;
            self.reconnect_timer.cancel();
            self.tracker.reset();
        }

        self.set_state(ConnectionState::Connecting);
        self.session += 1;
        let sink = TransportEventSink::new(self.session, self.events_tx.clone());
        let transport = self.transport.clone();
        let timeout = self.connect_timeout;

        self.cancel_open();
        self.open_task = Some(tokio::spawn(async move {
            let result = if timeout.is_zero() {
                transport.open(sink.clone()).await
            } else {
                match tokio::time::timeout(timeout, transport.open(sink.clone())).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Open(format!(
                        "timed out after {}ms",
                        timeout.as_millis()
                    ))),
                }
            };
            if let Err(e) = result {
                sink.emit(TransportEvent::Error(e));
            }
        }));
    }

    fn cancel_open(&mut self) {
        if let Some(task) = self.open_task.take() {
            task.abort();
        }
    }

    async fn disconnect(&mut self) {
        self.epoch += 1;
        self.reconnect_timer.cancel();
        self.connect_timer.cancel();
        self.heartbeat.suspend();
        self.cancel_open();

        let state = self.state();
        if state == ConnectionState::Idle && !self.transport_live {
            return;
        }

        if self.transport_live {
            if let Some(client_id) = self.client_id.clone() {
                let result = match self.factory.disconnect(Some(&client_id)) {
                    Ok(message) => self.send(message).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = result {
                    tracing::debug!(client_id = %client_id, error = %e, "Disconnect message not sent");
                }
            }
        }
        if self.transport_live || state == ConnectionState::Connecting {
            self.close_transport().await;
        }

        self.client_id = None;
        self.advice = None;
        self.tracker.reset();
        self.set_state(ConnectionState::Idle);
    }

    async fn subscribe(&mut self, subscription: Subscription) -> Result<(), FayeError> {
        let channel = subscription.channel.clone();
        let ext = subscription.ext.clone();
        let first_for_channel = !self.registry.contains_channel(&channel);

        tracing::debug!(channel = %channel, id = %subscription.id, "Registering subscription");
        self.registry.insert(subscription);

        match self.state() {
            ConnectionState::Connected => {
                if !first_for_channel {
                    return Ok(());
                }
                let message = self
                    .factory
                    .subscribe(self.client_id.as_ref(), &channel, &ext)?;
                self.send(message).await
            }
            ConnectionState::Idle | ConnectionState::Disconnected if self.auto_connect => {
                tracing::debug!(channel = %channel, "Subscription queued, connecting");
                self.start_connect(true);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn unsubscribe(&mut self, channel: ChannelName) -> Result<(), FayeError> {
        let removed = self.registry.remove_channel(&channel);
        if removed == 0 || !self.state().is_connected() {
            return Ok(());
        }

        let message = self
            .factory
            .unsubscribe(self.client_id.as_ref(), &channel, &Ext::new())?;
        self.send(message).await
    }

    async fn release(&mut self, id: SubscriptionId) {
        let Some(subscription) = self.registry.remove(id) else {
            return;
        };
        let channel = subscription.channel;
        if self.registry.contains_channel(&channel) || !self.state().is_connected() {
            return;
        }

        let result = match self
            .factory
            .unsubscribe(self.client_id.as_ref(), &channel, &Ext::new())
        {
            Ok(message) => self.send(message).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::warn!(channel = %channel, error = %e, "Failed to unsubscribe released subscription");
        }
    }

    // === Transport events ===

    async fn handle_transport_event(&mut self, session: u64, event: TransportEvent) {
        if session != self.session {
            tracing::trace!(session, current = self.session, "Ignoring stale transport event");
            return;
        }

        match event {
            TransportEvent::Opened => self.on_opened().await,
            TransportEvent::Closed { reason } => {
                tracing::info!(reason = ?reason, "Transport closed");
                self.on_lost().await;
            }
            TransportEvent::Error(e) if !self.transport_live => {
                tracing::warn!(
                    attempt = self.tracker.attempts(),
                    error = %e,
                    "Failed to open transport"
                );
                self.on_lost().await;
            }
            TransportEvent::Error(e) => {
                tracing::warn!(error = %e, "Transport failed");
                self.on_lost().await;
            }
            TransportEvent::Data(bytes) => match codec::decode(&bytes) {
                Ok(messages) => {
                    for inbound in messages {
                        self.on_inbound(inbound).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(bytes = bytes.len(), error = %e, "Dropping undecodable frame");
                }
            },
        }
    }

    async fn on_opened(&mut self) {
        if self.state() != ConnectionState::Connecting {
            tracing::debug!(state = %self.state(), "Ignoring open outside of connect");
            return;
        }

        // The attempt counter is reset by a successful handshake, not here.
        self.transport_live = true;
        let session = self.session;
        self.heartbeat
            .restart(self.timers_tx.clone(), move || TimerEvent::HeartbeatTick { session });

        self.set_state(ConnectionState::Handshaking);
        if let Err(e) = self.send_handshake().await {
            tracing::warn!(error = %e, "Failed to send handshake");
            self.apply_advice_policy().await;
        }
    }

    async fn on_lost(&mut self) {
        if self.state() == ConnectionState::Idle {
            return;
        }

        self.transport_live = false;
        self.heartbeat.suspend();
        self.connect_timer.cancel();
        self.client_id = None;
        // Later events from this transport session are duplicates.
        self.session += 1;

        self.apply_advice_policy().await;
    }

    async fn on_inbound(&mut self, inbound: InboundMessage) {
        match inbound.message.meta_channel() {
            Some(MetaChannel::Handshake) => self.on_handshake_response(inbound.message).await,
            Some(MetaChannel::Connect) => self.on_connect_response(inbound.message).await,
            Some(meta) => log_meta_response(meta, &inbound.message),
            None if inbound.message.channel.is_meta() => {
                tracing::debug!(channel = %inbound.message.channel, "Ignoring unknown meta channel");
            }
            None => self.deliver(&inbound),
        }
    }

    async fn on_handshake_response(&mut self, message: Message) {
        self.record_advice(message.advice.clone());

        if !message.is_successful() {
            tracing::warn!(error = ?message.error, "Handshake rejected");
            self.client_id = None;
            self.apply_advice_policy().await;
            return;
        }
        let Some(client_id) = message.client_id else {
            tracing::warn!("Handshake response without clientId");
            self.apply_advice_policy().await;
            return;
        };

        tracing::info!(client_id = %client_id, "Handshake accepted");
        self.client_id = Some(client_id);
        self.tracker.reset();
        self.set_state(ConnectionState::Connected);

        if let Err(e) = self.send_connect().await {
            tracing::warn!(error = %e, "Failed to send connect");
        }
        self.resubscribe_all().await;
    }

    async fn on_connect_response(&mut self, message: Message) {
        self.record_advice(message.advice.clone());

        if self.state() != ConnectionState::Connected {
            return;
        }
        if !message.is_successful() {
            tracing::warn!(error = ?message.error, "Connect rejected");
            self.apply_advice_policy().await;
            return;
        }

        let session = self.session;
        self.connect_timer.schedule(
            self.poll_interval,
            self.timers_tx.clone(),
            TimerEvent::ConnectDue { session },
        );
    }

    fn deliver(&self, inbound: &InboundMessage) {
        let channel = &inbound.message.channel;
        let Some(payload) = inbound.payload() else {
            tracing::debug!(channel = %channel, "Ignoring message without data");
            return;
        };

        let invoked = self.registry.dispatch(channel, &payload);
        tracing::trace!(channel = %channel, invoked, "Delivered message");
    }

    fn record_advice(&mut self, advice: Option<Advice>) {
        if let Some(advice) = advice {
            self.poll_interval = advice.interval();
            self.advice = Some(advice);
        }
    }

    /// Sends one subscribe per distinct registered channel name.
    ///
    /// A failed resubscribe is logged and skipped; the registration stays
    /// and is retried after the next handshake.
    async fn resubscribe_all(&mut self) {
        for (channel, ext) in self.registry.channels() {
            let result = match self
                .factory
                .subscribe(self.client_id.as_ref(), &channel, &ext)
            {
                Ok(message) => self.send(message).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                tracing::warn!(channel = %channel, error = %e, "Resubscribe failed");
            }
        }
    }

    // === Advice policy ===

    /// Consumes the stored advice and acts on it.
    async fn apply_advice_policy(&mut self) {
        loop {
            let advice = self.advice.take();
            match self.tracker.decide(advice) {
                ReconnectAction::Stop => {
                    tracing::info!("Server advised not to reconnect");
                    self.stop().await;
                    return;
                }
                ReconnectAction::Handshake { attempt } => {
                    self.client_id = None;
                    self.connect_timer.cancel();

                    if !self.transport_live {
                        tracing::info!(attempt, "Reopening transport for handshake");
                        self.set_state(ConnectionState::Reconnecting);
                        self.schedule_reconnect(Duration::ZERO);
                        return;
                    }

                    tracing::info!(attempt, "Re-handshaking on server advice");
                    self.set_state(ConnectionState::Handshaking);
                    match self.send_handshake().await {
                        Ok(()) => return,
                        Err(e) => {
                            tracing::warn!(attempt, error = %e, "Failed to send handshake");
                        }
                    }
                }
                ReconnectAction::Schedule { attempt, delay } => {
                    if self.transport_live {
                        self.close_transport().await;
                    }
                    self.client_id = None;
                    self.set_state(ConnectionState::Reconnecting);
                    tracing::info!(
                        attempt,
                        max_attempts = self.tracker.policy().max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Reconnect scheduled"
                    );
                    self.schedule_reconnect(delay);
                    return;
                }
                ReconnectAction::GiveUp => {
                    tracing::warn!(
                        max_attempts = self.tracker.policy().max_attempts,
                        "Reconnect attempts exhausted, call connect() to retry"
                    );
                    self.stop().await;
                    return;
                }
            }
        }
    }

    async fn stop(&mut self) {
        if self.transport_live {
            self.close_transport().await;
        }
        self.client_id = None;
        self.set_state(ConnectionState::Disconnected);
    }

    fn schedule_reconnect(&mut self, delay: Duration) {
        let epoch = self.epoch;
        self.reconnect_timer
            .schedule(delay, self.timers_tx.clone(), TimerEvent::ReconnectDue { epoch });
    }

    /// Closes the transport and retires its session, so the close event it
    /// produces is ignored.
    async fn close_transport(&mut self) {
        self.transport_live = false;
        self.heartbeat.suspend();
        self.connect_timer.cancel();
        self.session += 1;
        if let Err(e) = self.transport.close().await {
            tracing::debug!(error = %e, "Transport close failed");
        }
    }

    // === Timers ===

    async fn handle_timer(&mut self, timer: TimerEvent) {
        match timer {
            TimerEvent::ReconnectDue { epoch } => {
                if epoch != self.epoch || self.state() != ConnectionState::Reconnecting {
                    tracing::debug!("Ignoring stale reconnect timer");
                    return;
                }
                self.start_connect(false);
            }
            TimerEvent::ConnectDue { session } => {
                if session != self.session || self.state() != ConnectionState::Connected {
                    return;
                }
                if let Err(e) = self.send_connect().await {
                    tracing::warn!(error = %e, "Failed to send connect");
                }
            }
            TimerEvent::HeartbeatTick { session } => {
                if session != self.session || !self.transport_live {
                    return;
                }
                if let Err(e) = self.transport.ping().await {
                    tracing::debug!(error = %e, "Heartbeat ping failed");
                }
            }
        }
    }

    // === Outgoing ===

    async fn send_handshake(&mut self) -> Result<(), FayeError> {
        let message = self.factory.handshake();
        self.send(message).await
    }

    async fn send_connect(&mut self) -> Result<(), FayeError> {
        let message = self.factory.connect(self.client_id.as_ref())?;
        self.send(message).await
    }

    async fn send(&mut self, message: Message) -> Result<(), FayeError> {
        let message = self.plugins.apply(message);
        tracing::trace!(channel = %message.channel, "Sending message");
        let frame = codec::encode(std::slice::from_ref(&message))?;
        self.transport.send(frame).await?;
        Ok(())
    }
}

fn log_meta_response(meta: MetaChannel, message: &Message) {
    if message.is_successful() {
        tracing::debug!(
            channel = %message.channel,
            subscription = ?message.subscription.as_ref().map(|s| s.as_str()),
            "Control message acknowledged"
        );
    } else {
        tracing::warn!(
            meta = ?meta,
            subscription = ?message.subscription.as_ref().map(|s| s.as_str()),
            error = ?message.error,
            "Control message rejected"
        );
    }
}
