//! Transport port - Interface for the persistent message transport.
//!
//! The client layers the Bayeux protocol on top of any bidirectional,
//! already-framed byte transport (in production a websocket). TLS,
//! framing and wire-level ping/pong are the adapter's business.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::foundation::TransportError;

/// Something that happened on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The transport is live and may be written to.
    Opened,
    /// The transport is gone, cleanly or not.
    Closed { reason: Option<String> },
    /// One complete inbound frame.
    Data(Vec<u8>),
    /// The transport reported a failure. The client treats it as a close.
    Error(TransportError),
}

/// Where a transport delivers its events.
///
/// Each `open` gets a sink stamped with a fresh session number, so events
/// from an earlier, abandoned session can be told apart from the current one.
#[derive(Debug, Clone)]
pub struct TransportEventSink {
    session: u64,
    tx: mpsc::UnboundedSender<(u64, TransportEvent)>,
}

impl TransportEventSink {
    pub fn new(session: u64, tx: mpsc::UnboundedSender<(u64, TransportEvent)>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Delivers an event. Returns `false` once the client has gone away.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.tx.send((self.session, event)).is_ok()
    }

    /// True once nobody is listening any more.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Port for the bidirectional message transport.
///
/// Implementations must:
/// - emit `TransportEvent::Opened` on the sink once the transport is live
/// - emit `Closed` or `Error` when it goes away
/// - emit each inbound frame as `Data`
/// - preserve send order
///
/// # Example
///
/// ```ignore
/// transport.open(sink).await?;
/// transport.send(codec::encode(&[handshake])?).await?;
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens the transport, delivering subsequent events to `events`.
    ///
    /// The future may be dropped before it completes, when the client
    /// disconnects or the connect timeout elapses.
    async fn open(&self, events: TransportEventSink) -> Result<(), TransportError>;

    /// Sends one frame.
    ///
    /// Returns `TransportError::NotConnected` when the transport is not live.
    async fn send(&self, frame: Vec<u8>) -> Result<(), TransportError>;

    /// Sends a keepalive.
    async fn ping(&self) -> Result<(), TransportError>;

    /// Closes the transport. Closing an already closed transport is not an error.
    async fn close(&self) -> Result<(), TransportError>;
}
