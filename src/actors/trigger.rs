//! PeriodicTrigger - Feeds the full target list into the check queue
//!
//! The first tick fires immediately, later ticks follow at the configured cadence. A pass does
//! not wait for the checks of the previous pass: if they are still outstanding, the new tasks
//! queue behind them.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, instrument, warn};

use crate::Target;

use super::messages::TriggerCommand;
use super::scheduler::SchedulerHandle;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Actor owning the check timer
pub struct PeriodicTrigger {
    targets: Vec<Target>,
    scheduler: SchedulerHandle,
    interval_duration: Duration,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<TriggerCommand>,
}

impl PeriodicTrigger {
    pub fn new(
        targets: Vec<Target>,
        scheduler: SchedulerHandle,
        interval_duration: Duration,
        command_rx: mpsc::Receiver<TriggerCommand>,
    ) -> Self {
        Self {
            targets,
            scheduler,
            interval_duration: interval_duration.max(MIN_INTERVAL),
            command_rx,
        }
    }

    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!(
            "starting monitoring for {} websites, interval {}s",
            self.targets.len(),
            self.interval_duration.as_secs_f64()
        );

        let mut ticker = interval(self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.enqueue_all().await;
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(TriggerCommand::TriggerNow { respond_to }) => {
                            debug!("received TriggerNow command");
                            self.enqueue_all().await;
                            let _ = respond_to.send(());
                        }

                        Some(TriggerCommand::Shutdown { respond_to }) => {
                            debug!("received shutdown command");
                            let _ = respond_to.send(());
                            break;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!("periodic trigger stopped");
    }

    async fn enqueue_all(&self) {
        debug!("enqueueing {} checks", self.targets.len());

        for target in &self.targets {
            if let Err(e) = self.scheduler.submit(target.clone()).await {
                warn!("could not enqueue check of {}: {e:#}", target.name);
                return;
            }
        }
    }
}

/// Handle for controlling the PeriodicTrigger
#[derive(Clone)]
pub struct TriggerHandle {
    sender: mpsc::Sender<TriggerCommand>,
}

impl TriggerHandle {
    /// Spawn a new trigger; the first pass is enqueued right away
    pub fn spawn(targets: Vec<Target>, scheduler: SchedulerHandle, interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);

        let actor = PeriodicTrigger::new(targets, scheduler, interval, cmd_rx);

        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Enqueue an extra full pass and wait until all its checks are queued
    pub async fn trigger_now(&self) -> anyhow::Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(TriggerCommand::TriggerNow { respond_to: tx })
            .await?;

        rx.await?;
        Ok(())
    }

    /// Stop the timer; no further passes are enqueued once this returns
    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        if self
            .sender
            .send(TriggerCommand::Shutdown { respond_to: tx })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }
}
