//! CheckScheduler - Runs probe routines with bounded concurrency
//!
//! Tasks are taken from the queue in submission order and each runs on its own task. A check
//! first waits for its target to be free, then for one of the N permits, so at most N probes
//! are in flight. Checks queued behind a busy target hold no permit and never keep other
//! targets waiting.
//!
//! ## Message Flow
//!
//! ```text
//! submit → [check queue] → spawn → lock target → acquire permit → probe → release permit
//!                                                                   │
//!                                                                   └─ transition → NotifierHandle::submit
//! ```
//!
//! Errors returned by the routine are logged as warnings, panics are logged as errors. Neither
//! stops the scheduler. Shutdown closes the permits, which discards every check that has not
//! started probing yet.

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{Semaphore, mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};
use tokio::time::timeout;
use tracing::{debug, error, instrument, warn};

use crate::Target;
use crate::monitors::SiteMonitor;

use super::messages::{CheckTask, SchedulerCommand, ShutdownPolicy};

/// Actor owning the check queue and its worker pool
pub struct CheckScheduler {
    monitor: Arc<SiteMonitor>,

    /// Limits the number of concurrently running checks
    permits: Arc<Semaphore>,

    queue_rx: mpsc::Receiver<CheckTask>,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<SchedulerCommand>,

    in_flight: JoinSet<()>,
}

impl CheckScheduler {
    pub fn new(
        monitor: SiteMonitor,
        concurrency: usize,
        queue_rx: mpsc::Receiver<CheckTask>,
        command_rx: mpsc::Receiver<SchedulerCommand>,
    ) -> Self {
        Self {
            monitor: Arc::new(monitor),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            queue_rx,
            command_rx,
            in_flight: JoinSet::new(),
        }
    }

    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!(
            "starting check scheduler with concurrency {}",
            self.permits.available_permits()
        );

        loop {
            tokio::select! {
                biased;

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        SchedulerCommand::Shutdown { policy, respond_to } => {
                            debug!("received shutdown command");
                            self.shutdown(policy).await;
                            let _ = respond_to.send(());
                            break;
                        }
                    }
                }

                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    log_join_result(joined);
                }

                task = self.queue_rx.recv() => {
                    match task {
                        Some(task) => self.dispatch(task),
                        None => {
                            warn!("check queue closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        // Dropping a JoinSet aborts its tasks; running checks are left to finish on their own.
        self.in_flight.detach_all();
        debug!("check scheduler stopped");
    }

    /// Start the check on its own task; the task waits for its target and a permit
    fn dispatch(&mut self, task: CheckTask) {
        let monitor = Arc::clone(&self.monitor);
        let permits = Arc::clone(&self.permits);

        self.in_flight.spawn(async move {
            let CheckTask { target, respond_to } = task;

            if let Err(e) = monitor.check(&target, &permits).await {
                if permits.is_closed() {
                    debug!("check of {} discarded: {e:#}", target.name);
                    return;
                }
                warn!("check of {} failed: {e:#}", target.name);
            }

            if let Some(respond_to) = respond_to {
                let _ = respond_to.send(());
            }
        });
    }

    async fn shutdown(&mut self, policy: ShutdownPolicy) {
        self.queue_rx.close();
        self.permits.close();

        let mut discarded = 0;
        while self.queue_rx.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!("discarded {discarded} queued checks");
        }

        match policy {
            ShutdownPolicy::Drain { grace } => {
                let drained = timeout(grace, async {
                    while let Some(joined) = self.in_flight.join_next().await {
                        log_join_result(joined);
                    }
                })
                .await;

                if drained.is_err() {
                    warn!(
                        "grace period elapsed, abandoning {} running checks",
                        self.in_flight.len()
                    );
                }
            }
            ShutdownPolicy::Abandon => {
                if !self.in_flight.is_empty() {
                    debug!("abandoning {} running checks", self.in_flight.len());
                }
            }
        }
    }
}

fn log_join_result(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            error!("check task panicked: {e}");
        } else {
            warn!("check task did not complete: {e}");
        }
    }
}

/// Handle for submitting checks to the CheckScheduler
#[derive(Clone)]
pub struct SchedulerHandle {
    queue_tx: mpsc::Sender<CheckTask>,
    command_tx: mpsc::Sender<SchedulerCommand>,
}

impl SchedulerHandle {
    /// Spawn a new scheduler running `monitor` for every check
    ///
    /// `capacity` bounds the queue; submitters wait while it is full.
    pub fn spawn(monitor: SiteMonitor, concurrency: usize, capacity: usize) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(capacity.max(1));
        let (command_tx, command_rx) = mpsc::channel(8);

        let actor = CheckScheduler::new(monitor, concurrency, queue_rx, command_rx);

        tokio::spawn(actor.run());

        Self {
            queue_tx,
            command_tx,
        }
    }

    /// Queue a check of `target`
    pub async fn submit(&self, target: Target) -> anyhow::Result<()> {
        self.queue_tx
            .send(CheckTask::new(target))
            .await
            .map_err(|_| anyhow!("check scheduler is not accepting tasks"))
    }

    /// Queue a check of `target` and wait until it has run
    pub async fn check_now(&self, target: Target) -> anyhow::Result<()> {
        let (tx, rx) = oneshot::channel();
        self.queue_tx
            .send(CheckTask {
                target,
                respond_to: Some(tx),
            })
            .await
            .map_err(|_| anyhow!("check scheduler is not accepting tasks"))?;

        rx.await
            .map_err(|_| anyhow!("check was dropped before completing"))
    }

    /// Stop the scheduler and wait until it has finished according to `policy`
    pub async fn shutdown(&self, policy: ShutdownPolicy) {
        let (tx, rx) = oneshot::channel();
        if self
            .command_tx
            .send(SchedulerCommand::Shutdown {
                policy,
                respond_to: tx,
            })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }
}
