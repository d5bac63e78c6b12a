//! Periodic refresh task
//!
//! The poller owns a tokio task that calls [`Coordinator::refresh`] once per
//! update interval. Refreshes do blocking network I/O, so each one runs on
//! the blocking pool; the next tick is only considered after it returns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error};

use crate::coordinator::Coordinator;

/// Handle to a running polling task
///
/// Dropping the handle signals the task to stop after the current refresh.
#[derive(Debug)]
pub struct Poller {
    task_handle: Option<JoinHandle<()>>,

    shutdown_tx: watch::Sender<bool>,

    /// Total number of refreshes started by this poller
    poll_count: Arc<AtomicU64>,

    interval: Duration,

    started_at: SystemTime,
}

impl Poller {
    /// Start polling on the current tokio runtime
    ///
    /// The first refresh happens one interval from now; setup is expected
    /// to have done the initial refresh itself.
    pub fn start(coordinator: Arc<Coordinator>) -> Self {
        let interval = coordinator.update_interval();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let poll_count = Arc::new(AtomicU64::new(0));

        let task_poll_count = Arc::clone(&poll_count);
        let task_handle = tokio::spawn(async move {
            Self::polling_loop(coordinator, interval, shutdown_rx, task_poll_count).await;
        });

        Self {
            task_handle: Some(task_handle),
            shutdown_tx,
            poll_count,
            interval,
            started_at: SystemTime::now(),
        }
    }

    async fn polling_loop(
        coordinator: Arc<Coordinator>,
        interval: Duration,
        mut shutdown_rx: watch::Receiver<bool>,
        poll_count: Arc<AtomicU64>,
    ) {
        debug!(
            "Starting polling for {} (interval: {:?})",
            coordinator.params().host(),
            interval
        );

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => {}
            }

            poll_count.fetch_add(1, Ordering::Relaxed);

            let task_coordinator = Arc::clone(&coordinator);
            // Errors are recorded by the coordinator itself
            if let Err(e) = tokio::task::spawn_blocking(move || task_coordinator.refresh()).await {
                error!("Refresh task for {} panicked: {}", coordinator.params().host(), e);
            }
        }

        debug!("Polling ended for {}", coordinator.params().host());
    }

    /// Number of refreshes started so far
    pub fn poll_count(&self) -> u64 {
        self.poll_count.load(Ordering::Relaxed)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Stop polling and wait for an in-flight refresh to finish
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.task_handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}
