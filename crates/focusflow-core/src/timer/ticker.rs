//! Cancellable periodic tick schedule.
//!
//! The engine itself is caller-ticked; this is the one place that owns a
//! clock. A [`Ticker`] holds at most one scheduled task: starting a new
//! schedule aborts the previous one, so a resume recompute can never race
//! a stale tick loop, and re-initializing a view cannot leak a second
//! ticking task.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a periodic background task. Cancel-and-replace semantics:
/// at most one schedule is live per handle.
#[derive(Debug, Default)]
pub struct Ticker {
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `callback` every `period`, replacing any prior schedule.
    /// The task stops when the callback returns `false`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, period: Duration, mut callback: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.cancel();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // A suspended process should not burst-fire missed ticks;
            // resume recompute covers the gap from the wall clock.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await; // first tick is immediate
            loop {
                interval.tick().await;
                if !callback() {
                    break;
                }
            }
        }));
    }

    /// Abort the current schedule, if any. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Wait for the schedule to run to completion (callback returned
    /// `false`). Returns immediately if nothing is scheduled.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn runs_until_callback_stops_it() {
        let count = Arc::new(AtomicU32::new(0));
        let mut ticker = Ticker::new();
        let c = count.clone();
        ticker.start(Duration::from_millis(5), move || {
            c.fetch_add(1, Ordering::SeqCst) < 2
        });
        ticker.join().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn start_replaces_previous_schedule() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let mut ticker = Ticker::new();

        let f = first.clone();
        ticker.start(Duration::from_millis(5), move || {
            f.fetch_add(1, Ordering::SeqCst);
            true
        });
        let s = second.clone();
        ticker.start(Duration::from_millis(5), move || {
            s.fetch_add(1, Ordering::SeqCst) < 1
        });
        ticker.join().await;

        // The first loop was aborted before it could tick.
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let mut ticker = Ticker::new();
        ticker.start(Duration::from_secs(60), || true);
        assert!(ticker.is_scheduled());
        ticker.cancel();
        ticker.cancel();
        assert!(!ticker.is_scheduled());
    }
}
