//! Periodic poll tasks.
//!
//! Each task ticks on its own interval, runs its job and sends the resulting
//! actions to the dispatch loop. Cancelling stops new ticks only: a job that
//! is already running finishes and its actions are still delivered.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use zilstream_store::Action;

/// Owner of the scheduled tasks.
pub struct Scheduler {
    shutdown_token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            shutdown_token: CancellationToken::new(),
            handles: Vec::new(),
        }
    }

    /// Run `job` every `period`, starting immediately.
    pub fn every<F, Fut>(
        &mut self,
        name: &'static str,
        period: Duration,
        tx: mpsc::Sender<Vec<Action>>,
        job: F,
    ) where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Vec<Action>> + Send + 'static,
    {
        let token = self.shutdown_token.clone();
        debug!(task = name, period_ms = period.as_millis() as u64, "Scheduling task");

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let actions = job().await;
                if actions.is_empty() {
                    continue;
                }
                if tx.send(actions).await.is_err() {
                    debug!(task = name, "Dispatch loop gone");
                    break;
                }
            }
            debug!(task = name, "Scheduled task stopped");
        });
        self.handles.push(handle);
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Stop scheduling new ticks.
    pub fn shutdown(&self) {
        info!(tasks = self.handles.len(), "Scheduler shutdown requested");
        self.shutdown_token.cancel();
    }

    /// Cancel and drop every task, including jobs still running.
    pub fn abort(self) {
        self.shutdown();
        for handle in self.handles {
            handle.abort();
        }
    }

    /// Cancel and wait for every task to finish its current job.
    pub async fn join(self) {
        self.shutdown();
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ticks_deliver_actions() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut scheduler = Scheduler::new();
        let height = Arc::new(AtomicUsize::new(0));

        let counter = height.clone();
        scheduler.every("block", Duration::from_millis(10), tx, move || {
            let counter = counter.clone();
            async move {
                let h = counter.fetch_add(1, Ordering::SeqCst) + 1;
                vec![Action::BlockHeightUpdated(h as u64)]
            }
        });
        assert_eq!(scheduler.task_count(), 1);

        // First tick fires immediately
        assert_eq!(rx.recv().await, Some(vec![Action::BlockHeightUpdated(1)]));
        assert_eq!(rx.recv().await, Some(vec![Action::BlockHeightUpdated(2)]));

        scheduler.abort();
    }

    #[tokio::test]
    async fn test_empty_results_are_not_sent() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut scheduler = Scheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        scheduler.every("rates", Duration::from_millis(5), tx, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Vec::new()
            }
        });

        tokio::time::sleep(Duration::from_millis(40)).await;
        scheduler.join().await;

        assert!(runs.load(Ordering::SeqCst) >= 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_stops_new_ticks() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut scheduler = Scheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        scheduler.every("block", Duration::from_millis(5), tx, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                vec![Action::BlockHeightUpdated(1)]
            }
        });
        assert!(rx.recv().await.is_some());

        scheduler.shutdown();
        assert!(scheduler.is_shutdown());
        scheduler.join().await;

        let after = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after);

        // Sender dropped with the task
        while rx.try_recv().is_ok() {}
        assert!(rx.recv().await.is_none());
    }
}
