//! Faye Client - Bayeux publish/subscribe over a persistent transport
//!
//! The crate is split the hexagonal way:
//!
//! - [`domain`] - channel names and wildcard matching, the message envelope
//!   and codec, the connection state machine and reconnect policy
//! - [`ports`] - the transport, outgoing plugin and message handler seams
//! - [`adapters`] - websocket and in-memory transports, stock plugins
//! - [`application`] - the connection actor behind [`FayeClient`]
//! - [`config`] - environment-driven configuration for the binary

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{ClientOptions, FayeClient, SubscriptionHandle};
pub use domain::foundation::FayeError;
