//! Caller-side handle for one subscription registration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::WeakUnboundedSender;

use super::actor::Command;
use crate::domain::channel::ChannelName;
use crate::domain::foundation::SubscriptionId;

/// Keeps a subscription alive. Dropping it unsubscribes.
///
/// Delivery to the handler stops as soon as the handle is dropped, before
/// the connection has processed the release. The handle does not keep the
/// connection alive.
#[must_use = "dropping the handle immediately unsubscribes"]
pub struct SubscriptionHandle {
    id: SubscriptionId,
    channel: ChannelName,
    active: Arc<AtomicBool>,
    commands: WeakUnboundedSender<Command>,
}

impl SubscriptionHandle {
    pub(crate) fn new(
        id: SubscriptionId,
        channel: ChannelName,
        active: Arc<AtomicBool>,
        commands: WeakUnboundedSender<Command>,
    ) -> Self {
        Self {
            id,
            channel,
            active,
            commands,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn channel(&self) -> &ChannelName {
        &self.channel
    }

    /// False once this registration was removed, by dropping the handle or
    /// by `FayeClient::unsubscribe` on its channel name.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Ends the subscription. Same as dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(commands) = self.commands.upgrade() {
            let _ = commands.send(Command::Release { id: self.id });
        }
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle(
        commands: &mpsc::UnboundedSender<Command>,
    ) -> (SubscriptionHandle, Arc<AtomicBool>) {
        let active = Arc::new(AtomicBool::new(true));
        let handle = SubscriptionHandle::new(
            SubscriptionId::new(),
            ChannelName::parse("/foo").unwrap(),
            active.clone(),
            commands.downgrade(),
        );
        (handle, active)
    }

    #[test]
    fn drop_deactivates_and_releases() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (handle, active) = handle(&tx);
        let id = handle.id();

        drop(handle);

        assert!(!active.load(Ordering::Acquire));
        match rx.try_recv() {
            Ok(Command::Release { id: released }) => assert_eq!(released, id),
            _ => panic!("expected a release command"),
        }
    }

    #[test]
    fn already_removed_registration_is_not_released_again() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (handle, active) = handle(&tx);

        active.store(false, Ordering::Release);
        assert!(!handle.is_active());
        handle.unsubscribe();

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn drop_after_connection_is_gone_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (handle, active) = handle(&tx);
        drop(tx);
        drop(rx);

        drop(handle);

        assert!(!active.load(Ordering::Acquire));
    }
}
