//! WebSocket transport for Bayeux endpoints.

mod transport;

pub use transport::WebSocketTransport;
