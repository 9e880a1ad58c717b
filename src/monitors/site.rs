//! The probe routine executed by check workers
//!
//! ```text
//! lock site state → acquire permit → GET url → record outcome → [transition?] → render → notification queue
//! ```
//!
//! A failed probe is an ordinary outcome. It only ever ends up as a state transition and a log
//! line, never as an error of the routine itself.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{Local, Utc};
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use crate::Target;
use crate::actors::notifier::NotifierHandle;
use crate::alerts::{AlertData, AlertKind, MessageFormatter};
use crate::storage::{SiteStateStore, Transition};
use crate::util::format_duration;

use super::probe::{Probe, is_success};

/// Format of the `{{time}}` placeholder in down alerts
const ALERT_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

pub struct SiteMonitor {
    store: SiteStateStore,
    formatter: MessageFormatter,
    notifier: NotifierHandle,
    probe: Arc<dyn Probe>,
    request_timeout: Duration,
}

impl SiteMonitor {
    pub fn new(
        store: SiteStateStore,
        formatter: MessageFormatter,
        notifier: NotifierHandle,
        probe: Arc<dyn Probe>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            store,
            formatter,
            notifier,
            probe,
            request_timeout,
        }
    }

    /// Probe `target` once and alert on a state transition
    ///
    /// The target's state stays locked for the whole routine, so overlapping checks of the same
    /// target run one after the other. A permit from `permits` is only taken once the target is
    /// free and is held until the probe has finished.
    #[instrument(skip_all, fields(site = %target.name))]
    pub async fn check(&self, target: &Target, permits: &Semaphore) -> anyhow::Result<()> {
        let slot = self.store.get_or_init(target).await;
        let mut state = slot.lock().await;

        let permit = permits
            .acquire()
            .await
            .context("check pool is shut down")?;

        let start = Instant::now();
        let outcome = match self.probe.get(&target.url, self.request_timeout).await {
            Ok(status) if is_success(status) => Ok(()),
            Ok(status) => Err(format!("Request failed with status code {status}")),
            Err(e) => Err(e.to_string()),
        };
        let elapsed = start.elapsed();
        let now = Utc::now();
        drop(permit);

        let transition = match outcome {
            Ok(()) => {
                let transition = state.record_success(now);
                if transition.is_none() {
                    info!("{} is UP ({}ms)", target.name, elapsed.as_millis());
                }
                transition
            }
            Err(error) => {
                let transition = state.record_failure(error.clone(), now);
                if transition.is_none() {
                    info!("{} is still DOWN. Error: {error}", target.name);
                }
                transition
            }
        };

        // Keep the lock until the alert is queued so alerts of one target stay in order.
        let Some(transition) = transition else {
            return Ok(());
        };

        let message = self.render(target, &transition);
        let queued = self
            .notifier
            .submit(message)
            .await
            .with_context(|| format!("could not queue alert for {}", target.name));

        drop(state);
        queued
    }

    fn render(&self, target: &Target, transition: &Transition) -> String {
        let mut data = AlertData {
            name: target.name.clone(),
            url: target.url.clone(),
            ..AlertData::default()
        };

        match transition {
            Transition::WentDown { error, at } => {
                warn!("{} went DOWN. Error: {error}", target.name);
                data.error = Some(error.clone());
                data.time = Some(
                    at.with_timezone(&Local)
                        .format(ALERT_TIME_FORMAT)
                        .to_string(),
                );
                self.formatter.render(AlertKind::Down, &data)
            }
            Transition::Recovered { downtime } => {
                let downtime = format_duration(*downtime);
                info!("{} is BACK UP. Downtime: {downtime}", target.name);
                data.downtime = Some(downtime);
                self.formatter.render(AlertKind::Up, &data)
            }
        }
    }
}
