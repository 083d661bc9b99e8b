//! Cancellable repeating tasks.
//!
//! A [`RepeatingTask`] runs a callback on a fixed period until it is stopped
//! or dropped. Owners stop their tasks explicitly during shutdown.

use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// A callback running every `period` on the tokio runtime.
#[derive(Debug)]
pub struct RepeatingTask {
    name: &'static str,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RepeatingTask {
    /// Spawns `tick` to run every `period`. The first run happens one period
    /// after spawning.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                tokio::select! {
                    // Fires on an explicit stop and when the owner is dropped.
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => tick(),
                }
            }
            debug!(task = name, "Repeating task finished");
        });

        debug!(task = name, ?period, "Repeating task started");
        Self {
            name,
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true until the task has stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the task and waits for an in-flight tick to finish.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let (count, tick) = counter();
        let task = RepeatingTask::spawn("test", Duration::from_secs(10), tick);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        task.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticks() {
        let (count, tick) = counter();
        let task = RepeatingTask::spawn("test", Duration::from_secs(1), tick);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        task.stop().await;

        let seen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn century_period_starts_and_stops() {
        let (count, tick) = counter();
        let task = RepeatingTask::spawn("yearly", Duration::from_secs(100 * 365 * 24 * 3600), tick);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(task.is_running());
        task.stop().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_task() {
        let (count, tick) = counter();
        let task = RepeatingTask::spawn("test", Duration::from_secs(1), tick);
        assert!(task.is_running());
        drop(task);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
