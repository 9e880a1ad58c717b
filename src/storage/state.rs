//! Per-target up/down state machine
//!
//! ```text
//! up   + success → up    (no alert)
//! up   + failure → down  (Transition::WentDown)
//! down + failure → down  (latest error recorded, no alert)
//! down + success → up    (Transition::Recovered)
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteState {
    pub is_down: bool,

    /// Set exactly while `is_down` is true
    pub down_since: Option<DateTime<Utc>>,

    /// Most recent failure, cleared on recovery
    pub last_error: Option<String>,
}

/// A change of a target's up/down status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    WentDown { error: String, at: DateTime<Utc> },
    Recovered { downtime: Duration },
}

impl SiteState {
    pub fn record_success(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        if !self.is_down {
            return None;
        }

        // Clock adjustments can put down_since after now; report zero downtime then.
        let downtime = self
            .down_since
            .map(|since| (now - since).to_std().unwrap_or_default())
            .unwrap_or_default();

        *self = SiteState::default();

        Some(Transition::Recovered { downtime })
    }

    pub fn record_failure(&mut self, error: String, now: DateTime<Utc>) -> Option<Transition> {
        if self.is_down {
            self.last_error = Some(error);
            return None;
        }

        self.is_down = true;
        self.down_since = Some(now);
        self.last_error = Some(error.clone());

        Some(Transition::WentDown { error, at: now })
    }
}
