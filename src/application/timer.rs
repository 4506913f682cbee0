//! One-shot delayed events.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A cancellable one-shot timer that posts an event into a channel.
///
/// At most one event is pending; scheduling again replaces it. Dropping
/// the timer cancels it.
#[derive(Debug, Default)]
pub struct DelayedTask {
    handle: Option<JoinHandle<()>>,
}

impl DelayedTask {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Posts `event` to `tx` after `delay`, cancelling any pending event.
    pub fn schedule<T>(&mut self, delay: Duration, tx: mpsc::UnboundedSender<T>, event: T)
    where
        T: Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// True while an event is scheduled and not yet delivered.
    pub fn is_pending(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for DelayedTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
