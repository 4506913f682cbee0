//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the protocol core and the outside world. Adapters implement these ports.
//!
//! - `Transport` - bidirectional, already-framed message transport
//! - `OutgoingPlugin` - transform applied to every outbound message
//! - `MessageHandler` - delivery target of a subscription

mod message_handler;
mod outgoing_plugin;
mod transport;

pub use message_handler::{HandlerError, MessageHandler};
pub use outgoing_plugin::OutgoingPlugin;
pub use transport::{Transport, TransportEvent, TransportEventSink};
