//! Cancellable delayed task used to debounce validation.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A unit of work scheduled to run once after a delay.
///
/// Cancelling, or dropping the handle, before the delay elapses prevents the
/// work from running.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Schedules `work` to run after `delay`. Must be called within a tokio runtime.
    pub fn schedule<Fut>(delay: Duration, work: Fut) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// True until the work has run or the task was cancelled.
    pub fn is_pending(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
