//! WebSocket transport over tokio-tungstenite.
//!
//! Outgoing frames are sent as text (binary if they are not UTF-8).
//! Inbound text and binary frames are forwarded as `Data`; a close frame,
//! read error or end of stream ends the session.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::domain::foundation::TransportError;
use crate::ports::{Transport, TransportEvent, TransportEventSink};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport over a single websocket connection to a Bayeux endpoint.
pub struct WebSocketTransport {
    url: String,
    connect_timeout: Duration,
    writer: Mutex<Option<SplitSink<WsStream, WsMessage>>>,
    reader: StdMutex<Option<JoinHandle<()>>>,
}

impl WebSocketTransport {
    /// Creates a transport for `url` (`ws://` or `wss://`). Nothing is
    /// opened until [`Transport::open`].
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(10),
            writer: Mutex::new(None),
            reader: StdMutex::new(None),
        }
    }

    /// Bounds the websocket handshake. Zero waits indefinitely.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn replace_reader(&self, handle: Option<JoinHandle<()>>) {
        let previous = match self.reader.lock() {
            Ok(mut reader) => std::mem::replace(&mut *reader, handle),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), handle),
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self, events: TransportEventSink) -> Result<(), TransportError> {
        tracing::debug!(url = %self.url, "Opening websocket");

        let connecting = connect_async(self.url.as_str());
        let connected = if self.connect_timeout.is_zero() {
            connecting.await
        } else {
            tokio::time::timeout(self.connect_timeout, connecting)
                .await
                .map_err(|_| {
                    TransportError::Open(format!(
                        "connect timed out after {}s",
                        self.connect_timeout.as_secs()
                    ))
                })?
        };
        let (stream, _response) = connected.map_err(|e| TransportError::Open(e.to_string()))?;
        let (sink, stream) = stream.split();

        *self.writer.lock().await = Some(sink);
        events.emit(TransportEvent::Opened);
        self.replace_reader(Some(tokio::spawn(read_loop(stream, events))));

        Ok(())
    }

    async fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        let sink = writer.as_mut().ok_or(TransportError::NotConnected)?;

        let message = match String::from_utf8(frame) {
            Ok(text) => WsMessage::Text(text),
            Err(e) => WsMessage::Binary(e.into_bytes()),
        };
        sink.send(message)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn ping(&self) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        let sink = writer.as_mut().ok_or(TransportError::NotConnected)?;
        sink.send(WsMessage::Ping(Vec::new()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        let writer = self.writer.lock().await.take();
        self.replace_reader(None);

        if let Some(mut sink) = writer {
            if let Err(e) = sink.send(WsMessage::Close(None)).await {
                tracing::debug!("Close frame not delivered: {}", e);
            }
            let _ = sink.close().await;
        }
        Ok(())
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.replace_reader(None);
    }
}

/// Forwards inbound frames until the socket ends, then reports how it ended.
async fn read_loop(mut stream: SplitStream<WsStream>, events: TransportEventSink) {
    while let Some(result) = stream.next().await {
        match result {
            Ok(WsMessage::Text(text)) => {
                if !events.emit(TransportEvent::Data(text.into_bytes())) {
                    return;
                }
            }
            Ok(WsMessage::Binary(bytes)) => {
                if !events.emit(TransportEvent::Data(bytes)) {
                    return;
                }
            }
            Ok(WsMessage::Close(frame)) => {
                let reason = frame
                    .map(|f| f.reason.to_string())
                    .filter(|reason| !reason.is_empty());
                tracing::debug!(reason = ?reason, "Websocket closed by server");
                events.emit(TransportEvent::Closed { reason });
                return;
            }
            Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) | Ok(WsMessage::Frame(_)) => {
                // Control frames are answered by tungstenite
            }
            Err(e) => {
                tracing::debug!("Websocket read error: {}", e);
                events.emit(TransportEvent::Error(TransportError::Receive(e.to_string())));
                return;
            }
        }
    }
    events.emit(TransportEvent::Closed { reason: None });
}
