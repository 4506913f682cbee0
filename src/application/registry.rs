//! Subscription registry and message dispatch.
//!
//! Registrations are kept in insertion order. Several registrations may
//! share a channel name; the server only ever sees one subscription per
//! distinct name.
//!
//! Dispatch takes a snapshot of the matching registrations before invoking
//! any handler, so a handler that unsubscribes (or drops a handle) during
//! delivery never disturbs the iteration.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::channel::ChannelName;
use crate::domain::foundation::SubscriptionId;
use crate::domain::message::Ext;
use crate::ports::MessageHandler;

/// One registered interest in a channel.
#[derive(Clone)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub channel: ChannelName,
    pub ext: Ext,
    pub handler: Arc<dyn MessageHandler>,
    /// Cleared when the owning handle is dropped; an inactive registration
    /// receives nothing even if still in a snapshot.
    pub active: Arc<AtomicBool>,
}

impl Subscription {
    pub fn new(channel: ChannelName, ext: Ext, handler: Arc<dyn MessageHandler>) -> Self {
        Self {
            id: SubscriptionId::new(),
            channel,
            ext,
            handler,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("active", &self.is_active())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: Vec<Subscription>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, subscription: Subscription) {
        self.entries.push(subscription);
    }

    pub fn remove(&mut self, id: SubscriptionId) -> Option<Subscription> {
        let position = self.entries.iter().position(|s| s.id == id)?;
        let removed = self.entries.remove(position);
        removed.active.store(false, Ordering::Release);
        Some(removed)
    }

    /// Removes every registration for `channel`, returning how many there were.
    pub fn remove_channel(&mut self, channel: &ChannelName) -> usize {
        let before = self.entries.len();
        self.entries.retain(|s| {
            if &s.channel == channel {
                s.active.store(false, Ordering::Release);
                false
            } else {
                true
            }
        });
        before - self.entries.len()
    }

    pub fn contains_channel(&self, channel: &ChannelName) -> bool {
        self.entries.iter().any(|s| &s.channel == channel)
    }

    /// Distinct channel names in first-registration order, each with the ext
    /// fields of its first registration.
    pub fn channels(&self) -> Vec<(ChannelName, Ext)> {
        let mut seen: Vec<(ChannelName, Ext)> = Vec::new();
        for subscription in &self.entries {
            if !seen.iter().any(|(name, _)| name == &subscription.channel) {
                seen.push((subscription.channel.clone(), subscription.ext.clone()));
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invokes every active handler whose channel matches `channel`.
    ///
    /// Handler errors and panics are logged and do not stop delivery to the
    /// remaining handlers. Returns the number of handlers invoked.
    pub fn dispatch(&self, channel: &ChannelName, payload: &[u8]) -> usize {
        let snapshot: Vec<Subscription> = self
            .entries
            .iter()
            .filter(|s| s.channel.matches(channel))
            .cloned()
            .collect();

        let mut invoked = 0;
        for subscription in snapshot {
            if !subscription.is_active() {
                continue;
            }
            invoked += 1;

            let handler = subscription.handler.clone();
            match catch_unwind(AssertUnwindSafe(|| handler.handle(channel, payload))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(
                    subscription = %subscription.channel,
                    channel = %channel,
                    error = %e,
                    "Subscription handler failed"
                ),
                Err(_) => tracing::warn!(
                    subscription = %subscription.channel,
                    channel = %channel,
                    "Subscription handler panicked"
                ),
            }
        }
        invoked
    }
}
