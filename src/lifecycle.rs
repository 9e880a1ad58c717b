//! Startup and shutdown of the check pipeline
//!
//! Startup order:
//!
//! 1. transport (passed in already constructed)
//! 2. notification dispatcher
//! 3. check scheduler
//! 4. periodic trigger, which enqueues the first pass immediately
//!
//! Shutdown runs the other way round. The timer stops first, then the scheduler stops taking
//! checks, and finally the dispatcher delivers what the last checks produced.

use std::sync::Arc;

use tracing::info;

use crate::actors::messages::ShutdownPolicy;
use crate::actors::notifier::NotifierHandle;
use crate::actors::scheduler::SchedulerHandle;
use crate::actors::trigger::TriggerHandle;
use crate::alerts::MessageFormatter;
use crate::config::ResolvedConfig;
use crate::monitors::{Probe, SiteMonitor};
use crate::storage::SiteStateStore;
use crate::transport::Transport;

/// A running monitor
pub struct Monitor {
    store: SiteStateStore,
    notifier: NotifierHandle,
    scheduler: SchedulerHandle,
    trigger: TriggerHandle,
}

impl Monitor {
    /// Start all actors; must be called from within a tokio runtime
    pub fn start(
        config: &ResolvedConfig,
        transport: Arc<dyn Transport>,
        probe: Arc<dyn Probe>,
    ) -> Self {
        let store = SiteStateStore::new();

        let notifier = NotifierHandle::spawn(transport, config.notification_queue_capacity);

        let site_monitor = SiteMonitor::new(
            store.clone(),
            MessageFormatter::new(config.templates.clone()),
            notifier.clone(),
            probe,
            config.request_timeout,
        );
        let scheduler = SchedulerHandle::spawn(
            site_monitor,
            config.check_concurrency,
            config.check_queue_capacity,
        );

        info!(
            "queues initialized: check concurrency {}, notification concurrency 1",
            config.check_concurrency
        );

        let trigger = TriggerHandle::spawn(
            config.targets.clone(),
            scheduler.clone(),
            config.check_interval,
        );

        Self {
            store,
            notifier,
            scheduler,
            trigger,
        }
    }

    pub fn store(&self) -> &SiteStateStore {
        &self.store
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    pub fn notifier(&self) -> &NotifierHandle {
        &self.notifier
    }

    pub fn trigger(&self) -> &TriggerHandle {
        &self.trigger
    }

    pub async fn shutdown(self, policy: ShutdownPolicy) {
        info!("shutting down");

        self.trigger.shutdown().await;
        self.scheduler.shutdown(policy).await;
        self.notifier.shutdown(policy).await;

        info!("monitor stopped");
    }
}
