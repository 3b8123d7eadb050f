//! Delay-then-run scheduling where each new schedule supersedes the previous one.

use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;
use tracing::trace;

/// Holds at most one pending timer. Scheduling aborts the previous timer, and so does
/// dropping the debouncer, so a discarded view never fires a late task.
///
/// Only the wait is cancellable: once the delay elapses the task is detached and runs
/// to completion even if something new is scheduled meanwhile.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` after the quiet period unless superseded first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        }));
    }

    /// Abort the pending timer, if any. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                trace!("cancelled pending debounce timer");
                true
            }
            Some(_) | None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
