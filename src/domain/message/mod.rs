//! Bayeux message envelope, advice, construction and framing.

mod advice;
pub mod codec;
mod envelope;
mod factory;

pub use advice::{Advice, Reconnect};
pub use codec::InboundMessage;
pub use envelope::{Ext, Message, MetaChannel};
pub use factory::{MessageFactory, BAYEUX_VERSION};
