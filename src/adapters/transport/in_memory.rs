//! In-memory transport for testing.
//!
//! Records every frame the client sends and lets a test play the server:
//! inject inbound frames, drop the connection, or refuse to open.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on lock operations which will panic if locks are poisoned.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::RwLock;
use tokio::sync::Notify;

use crate::domain::foundation::TransportError;
use crate::ports::{Transport, TransportEvent, TransportEventSink};

#[derive(Default)]
struct State {
    sink: Option<TransportEventSink>,
    open: bool,
    fail_opens: bool,
    sent: Vec<Vec<u8>>,
    opens: usize,
    closes: usize,
    pings: usize,
}

/// In-memory transport for testing.
///
/// Features:
/// - Frame capture for assertions
/// - Scripted inbound frames, closes and errors
/// - Open failure simulation
///
/// # Example
///
/// ```ignore
/// let transport = Arc::new(InMemoryTransport::new());
/// let client = FayeClient::builder(transport.clone()).build();
///
/// client.connect().await?;
/// transport.wait_for_messages("/meta/handshake", 1).await;
/// transport.deliver_json(&json!([{"channel": "/meta/handshake", ...}]));
/// ```
pub struct InMemoryTransport {
    state: RwLock<State>,
    sent_notify: Notify,
}

impl InMemoryTransport {
    /// Creates a closed transport that opens successfully.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            sent_notify: Notify::new(),
        }
    }

    // === Scripting ===

    /// Makes subsequent `open` calls fail (or succeed again).
    pub fn fail_opens(&self, fail: bool) {
        self.write().fail_opens = fail;
    }

    /// Delivers an inbound frame to the client. Returns `false` if the
    /// transport is not open.
    pub fn deliver(&self, frame: impl Into<Vec<u8>>) -> bool {
        let state = self.read();
        match (&state.sink, state.open) {
            (Some(sink), true) => sink.emit(TransportEvent::Data(frame.into())),
            _ => false,
        }
    }

    /// Delivers a JSON value as an inbound frame.
    pub fn deliver_json(&self, value: &Value) -> bool {
        self.deliver(value.to_string())
    }

    /// Drops the connection from the server side.
    pub fn simulate_close(&self, reason: Option<&str>) {
        let mut state = self.write();
        state.open = false;
        if let Some(sink) = state.sink.take() {
            sink.emit(TransportEvent::Closed {
                reason: reason.map(str::to_string),
            });
        }
    }

    /// Reports a transport failure, which also ends the connection.
    pub fn simulate_error(&self, error: TransportError) {
        let mut state = self.write();
        state.open = false;
        if let Some(sink) = state.sink.take() {
            sink.emit(TransportEvent::Error(error));
        }
    }

    // === Test Helpers ===

    pub fn is_open(&self) -> bool {
        self.read().open
    }

    pub fn open_count(&self) -> usize {
        self.read().opens
    }

    pub fn close_count(&self) -> usize {
        self.read().closes
    }

    pub fn ping_count(&self) -> usize {
        self.read().pings
    }

    /// Returns all frames sent so far.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.read().sent.clone()
    }

    /// Returns every sent envelope, flattening batched frames.
    pub fn sent_messages(&self) -> Vec<Value> {
        self.read()
            .sent
            .iter()
            .filter_map(|frame| serde_json::from_slice::<Value>(frame).ok())
            .flat_map(|value| match value {
                Value::Array(items) => items,
                other => vec![other],
            })
            .collect()
    }

    /// Returns sent envelopes on `channel`.
    pub fn sent_on(&self, channel: &str) -> Vec<Value> {
        self.sent_messages()
            .into_iter()
            .filter(|message| message["channel"] == channel)
            .collect()
    }

    /// Forgets all sent frames.
    pub fn clear_sent(&self) {
        self.write().sent.clear();
    }

    /// Waits until at least `count` envelopes were sent on `channel`.
    ///
    /// Wrap in `tokio::time::timeout` to bound the wait.
    pub async fn wait_for_messages(&self, channel: &str, count: usize) -> Vec<Value> {
        loop {
            let notified = self.sent_notify.notified();
            let sent = self.sent_on(channel);
            if sent.len() >= count {
                return sent;
            }
            notified.await;
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state
            .read()
            .expect("InMemoryTransport: state lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state
            .write()
            .expect("InMemoryTransport: state write lock poisoned")
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn open(&self, events: TransportEventSink) -> Result<(), TransportError> {
        let mut state = self.write();
        state.opens += 1;
        if state.fail_opens {
            return Err(TransportError::Open("simulated open failure".to_string()));
        }
        state.open = true;
        events.emit(TransportEvent::Opened);
        state.sink = Some(events);
        Ok(())
    }

    async fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        {
            let mut state = self.write();
            if !state.open {
                return Err(TransportError::NotConnected);
            }
            state.sent.push(frame);
        }
        self.sent_notify.notify_waiters();
        Ok(())
    }

    async fn ping(&self) -> Result<(), TransportError> {
        let mut state = self.write();
        if !state.open {
            return Err(TransportError::NotConnected);
        }
        state.pings += 1;
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut state = self.write();
        state.closes += 1;
        state.open = false;
        if let Some(sink) = state.sink.take() {
            sink.emit(TransportEvent::Closed { reason: None });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn sink() -> (TransportEventSink, mpsc::UnboundedReceiver<(u64, TransportEvent)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TransportEventSink::new(1, tx), rx)
    }

    #[tokio::test]
    async fn open_emits_opened() {
        let transport = InMemoryTransport::new();
        let (sink, mut rx) = sink();

        transport.open(sink).await.unwrap();

        assert!(transport.is_open());
        assert_eq!(rx.recv().await, Some((1, TransportEvent::Opened)));
    }

    #[tokio::test]
    async fn failing_open_is_counted() {
        let transport = InMemoryTransport::new();
        transport.fail_opens(true);
        let (sink, _rx) = sink();

        let result = transport.open(sink).await;

        assert!(matches!(result, Err(TransportError::Open(_))));
        assert_eq!(transport.open_count(), 1);
        assert!(!transport.is_open());
    }

    #[tokio::test]
    async fn send_requires_open_transport() {
        let transport = InMemoryTransport::new();
        let result = transport.send(b"[]".to_vec()).await;
        assert_eq!(result, Err(TransportError::NotConnected));
    }

    #[tokio::test]
    async fn sent_messages_flatten_batches() {
        let transport = InMemoryTransport::new();
        let (sink, _rx) = sink();
        transport.open(sink).await.unwrap();

        let frame = json!([{"channel": "/meta/connect"}, {"channel": "/meta/subscribe"}]);
        transport.send(frame.to_string().into_bytes()).await.unwrap();

        assert_eq!(transport.sent_messages().len(), 2);
        assert_eq!(transport.sent_on("/meta/subscribe").len(), 1);
    }

    #[tokio::test]
    async fn deliver_forwards_frames_while_open() {
        let transport = InMemoryTransport::new();
        let (sink, mut rx) = sink();
        transport.open(sink).await.unwrap();
        rx.recv().await;

        assert!(transport.deliver("[]"));
        assert_eq!(
            rx.recv().await,
            Some((1, TransportEvent::Data(b"[]".to_vec())))
        );
    }

    #[tokio::test]
    async fn simulate_close_emits_closed_once() {
        let transport = InMemoryTransport::new();
        let (sink, mut rx) = sink();
        transport.open(sink).await.unwrap();
        rx.recv().await;

        transport.simulate_close(Some("server restart"));
        transport.simulate_close(None);

        assert_eq!(
            rx.recv().await,
            Some((
                1,
                TransportEvent::Closed {
                    reason: Some("server restart".to_string())
                }
            ))
        );
        assert!(rx.try_recv().is_err());
        assert!(!transport.deliver("[]"));
    }

    #[tokio::test]
    async fn wait_for_messages_returns_once_sent() {
        let transport = std::sync::Arc::new(InMemoryTransport::new());
        let (sink, _rx) = sink();
        transport.open(sink).await.unwrap();

        let waiter = {
            let transport = transport.clone();
            tokio::spawn(async move { transport.wait_for_messages("/meta/handshake", 1).await })
        };
        tokio::task::yield_now().await;
        transport
            .send(br#"[{"channel":"/meta/handshake"}]"#.to_vec())
            .await
            .unwrap();

        let sent = waiter.await.unwrap();
        assert_eq!(sent.len(), 1);
    }
}
