//! Domain layer - Bayeux protocol types and policies.
//!
//! Everything here is synchronous and free of I/O:
//!
//! - `foundation` - identifiers, errors, the state machine trait
//! - `channel` - channel names and wildcard matching
//! - `message` - envelopes, advice, construction and framing
//! - `connection` - lifecycle states and the reconnect policy

pub mod channel;
pub mod connection;
pub mod foundation;
pub mod message;
