//! NotificationDispatcher - Delivers rendered alerts through the transport
//!
//! Exactly one message is in flight at any time. This keeps delivery in submission order and
//! stays within the rate limits of chat APIs.
//!
//! ## Failure Handling
//!
//! A failed send is logged and counted, then the next message gets its turn. Messages are not
//! retried. Every send runs on its own task so a panicking transport only costs that message.

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, instrument, warn};

use crate::transport::Transport;

use super::messages::{
    DispatchStats, NotificationTask, NotifierCommand, NotifierMessage, ShutdownPolicy,
};

/// Actor draining the notification queue
pub struct NotificationDispatcher {
    transport: Arc<dyn Transport>,

    /// Queued notifications and flush markers
    queue_rx: mpsc::Receiver<NotifierMessage>,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<NotifierCommand>,

    stats: DispatchStats,
}

impl NotificationDispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        queue_rx: mpsc::Receiver<NotifierMessage>,
        command_rx: mpsc::Receiver<NotifierCommand>,
    ) -> Self {
        Self {
            transport,
            queue_rx,
            command_rx,
            stats: DispatchStats::default(),
        }
    }

    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!("starting notification dispatcher");

        loop {
            tokio::select! {
                biased;

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        NotifierCommand::GetStats { respond_to } => {
                            let _ = respond_to.send(self.stats);
                        }

                        NotifierCommand::Shutdown { policy, respond_to } => {
                            debug!("received shutdown command");
                            self.shutdown(policy).await;
                            let _ = respond_to.send(());
                            break;
                        }
                    }
                }

                msg = self.queue_rx.recv() => {
                    match msg {
                        Some(msg) => self.handle(msg).await,
                        None => {
                            warn!("notification queue closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!(
            "notification dispatcher stopped ({} delivered, {} failed)",
            self.stats.delivered, self.stats.failed
        );
    }

    async fn handle(&mut self, msg: NotifierMessage) {
        match msg {
            NotifierMessage::Deliver(task) => self.deliver(task).await,
            NotifierMessage::Flush { respond_to } => {
                let _ = respond_to.send(());
            }
        }
    }

    async fn deliver(&mut self, task: NotificationTask) {
        let transport = Arc::clone(&self.transport);
        let result = tokio::spawn(async move { transport.send(&task.message).await }).await;

        match result {
            Ok(Ok(())) => {
                self.stats.delivered += 1;
                debug!("notification delivered");
            }
            Ok(Err(e)) => {
                self.stats.failed += 1;
                error!("failed to deliver notification: {e:#}");
            }
            Err(e) => {
                self.stats.failed += 1;
                error!("notification task did not complete: {e}");
            }
        }
    }

    async fn shutdown(&mut self, policy: ShutdownPolicy) {
        self.queue_rx.close();

        match policy {
            ShutdownPolicy::Drain { grace } => {
                if timeout(grace, self.drain()).await.is_err() {
                    warn!("grace period elapsed, abandoning remaining notifications");
                }
            }
            ShutdownPolicy::Abandon => {
                let mut abandoned = 0;
                while let Ok(msg) = self.queue_rx.try_recv() {
                    if matches!(msg, NotifierMessage::Deliver(_)) {
                        abandoned += 1;
                    }
                }
                if abandoned > 0 {
                    warn!("abandoned {abandoned} queued notifications");
                }
            }
        }
    }

    async fn drain(&mut self) {
        while let Some(msg) = self.queue_rx.recv().await {
            self.handle(msg).await;
        }
    }
}

/// Handle for submitting to the NotificationDispatcher
#[derive(Clone)]
pub struct NotifierHandle {
    queue_tx: mpsc::Sender<NotifierMessage>,
    command_tx: mpsc::Sender<NotifierCommand>,
}

impl NotifierHandle {
    /// Spawn a new dispatcher
    ///
    /// `capacity` bounds the queue; submitters wait while it is full.
    pub fn spawn(transport: Arc<dyn Transport>, capacity: usize) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(capacity.max(1));
        let (command_tx, command_rx) = mpsc::channel(8);

        let actor = NotificationDispatcher::new(transport, queue_rx, command_rx);

        tokio::spawn(actor.run());

        Self {
            queue_tx,
            command_tx,
        }
    }

    /// Queue a rendered message for delivery
    pub async fn submit(&self, message: String) -> anyhow::Result<()> {
        self.queue_tx
            .send(NotifierMessage::Deliver(NotificationTask { message }))
            .await
            .map_err(|_| anyhow!("notification dispatcher is not accepting messages"))
    }

    /// Wait until every message submitted so far has been attempted
    pub async fn flush(&self) -> anyhow::Result<()> {
        let (tx, rx) = oneshot::channel();
        self.queue_tx
            .send(NotifierMessage::Flush { respond_to: tx })
            .await
            .map_err(|_| anyhow!("notification dispatcher is not accepting messages"))?;

        rx.await?;
        Ok(())
    }

    pub async fn stats(&self) -> Option<DispatchStats> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(NotifierCommand::GetStats { respond_to: tx })
            .await
            .ok()?;

        rx.await.ok()
    }

    /// Stop the dispatcher and wait until it has finished according to `policy`
    pub async fn shutdown(&self, policy: ShutdownPolicy) {
        let (tx, rx) = oneshot::channel();
        if self
            .command_tx
            .send(NotifierCommand::Shutdown {
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
