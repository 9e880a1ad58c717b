use std::time::Duration;

use anyhow::{Context, bail};
use tracing::{trace, warn};

use crate::Target;

/// Queue depth of the check channel before submitters start waiting
pub const CHECK_QUEUE_CAPACITY: usize = 1024;

/// Queue depth of the notification channel before check workers start waiting
pub const NOTIFICATION_QUEUE_CAPACITY: usize = 256;

/// Message templates, keyed by alert kind
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Templates {
    pub down: Option<String>,
    pub up: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub websites: Vec<Target>,

    /// Seconds between two full check cycles
    pub check_interval_seconds: Option<f64>,

    /// Probe timeout in milliseconds
    pub request_timeout: Option<f64>,

    pub templates: Option<Templates>,

    /// Number of probes allowed to run at the same time
    pub check_concurrency: Option<usize>,

    /// How long shutdown waits for in-flight work
    pub shutdown_grace_seconds: Option<f64>,
}

/// Configuration with all defaults applied and validated
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub targets: Vec<Target>,
    pub check_interval: Duration,
    pub request_timeout: Duration,
    pub check_concurrency: usize,
    pub check_queue_capacity: usize,
    pub notification_queue_capacity: usize,
    pub shutdown_grace: Duration,
    pub templates: Templates,
}

fn default_check_interval_seconds() -> f64 {
    60.0
}

fn default_request_timeout_ms() -> f64 {
    10_000.0
}

fn default_check_concurrency() -> usize {
    5
}

fn default_shutdown_grace_seconds() -> f64 {
    5.0
}

/// Convert a configured number of seconds, rejecting values that are not a positive duration
fn positive_secs(key: &str, secs: f64) -> anyhow::Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        bail!("{key} must be a number greater than zero, got {secs}");
    }
    Duration::try_from_secs_f64(secs).with_context(|| format!("{key} is out of range"))
}

impl Config {
    pub fn resolve(self) -> anyhow::Result<ResolvedConfig> {
        let check_interval = positive_secs(
            "checkIntervalSeconds",
            self.check_interval_seconds
                .unwrap_or_else(default_check_interval_seconds),
        )?;

        let request_timeout = positive_secs(
            "requestTimeout",
            self.request_timeout.unwrap_or_else(default_request_timeout_ms) / 1000.0,
        )?;

        let shutdown_grace = match self.shutdown_grace_seconds {
            Some(secs) if secs == 0.0 => Duration::ZERO,
            Some(secs) => positive_secs("shutdownGraceSeconds", secs)?,
            None => Duration::from_secs_f64(default_shutdown_grace_seconds()),
        };

        let concurrency = self
            .check_concurrency
            .unwrap_or_else(default_check_concurrency);
        if concurrency == 0 {
            bail!("checkConcurrency must be greater than zero");
        }

        for target in &self.websites {
            reqwest::Url::parse(&target.url)
                .with_context(|| format!("invalid url for website '{}'", target.name))?;
        }

        if self.websites.is_empty() {
            warn!("no websites configured, nothing will be monitored");
        }

        Ok(ResolvedConfig {
            targets: self.websites,
            check_interval,
            request_timeout,
            check_concurrency: concurrency,
            check_queue_capacity: CHECK_QUEUE_CAPACITY,
            notification_queue_capacity: NOTIFICATION_QUEUE_CAPACITY,
            shutdown_grace,
            templates: self.templates.unwrap_or_default(),
        })
    }
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)
        .with_context(|| format!("could not read configuration file '{path}'"))?;
    serde_json::from_str(&file_content)
        .with_context(|| format!("invalid configuration file '{path}'"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
