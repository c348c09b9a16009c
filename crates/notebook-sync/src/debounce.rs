//! Cancel-and-restart timer for a single pending action.

use std::cell::RefCell;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs an action once things have been quiet for `delay`.
///
/// Each `schedule` aborts the previously pending timer, so a burst of calls
/// runs only the last action. The action itself runs synchronously when the
/// timer fires; anything long-running should be spawned from it, otherwise a
/// later `schedule` could not tell a waiting timer from running work.
///
/// Timers are local tasks: call from inside a `tokio::task::LocalSet`.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: RefCell<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: RefCell::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the timer with `action`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a [`tokio::task::LocalSet`].
    pub fn schedule(&self, action: impl FnOnce() + 'static) {
        let delay = self.delay;
        let timer = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        if let Some(previous) = self.pending.replace(Some(timer)) {
            previous.abort();
        }
    }

    /// Drop the pending action, if any.
    pub fn cancel(&self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    /// True while a timer is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
