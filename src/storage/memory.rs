//! In-memory site state store
//!
//! One entry per target url, created on first use and kept for the lifetime of the process.
//! Each entry sits behind its own async mutex, so probes of the same target are serialized
//! while different targets proceed independently.
//!
//! ## Limitations
//!
//! - **No persistence**: state is rebuilt by the next check cycle after a restart

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use super::state::SiteState;
use crate::Target;

/// Shared handle to a single target's state
pub type SiteSlot = Arc<Mutex<SiteState>>;

#[derive(Debug, Clone, Default)]
pub struct SiteStateStore {
    sites: Arc<Mutex<HashMap<String, SiteSlot>>>,
}

impl SiteStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the state slot for `target`, creating an up state if it is not tracked yet
    pub async fn get_or_init(&self, target: &Target) -> SiteSlot {
        let mut sites = self.sites.lock().await;

        sites
            .entry(target.url.clone())
            .or_insert_with(|| {
                debug!("tracking new site {} ({})", target.name, target.url);
                Arc::new(Mutex::new(SiteState::default()))
            })
            .clone()
    }

    /// Copy of the current state, if the url has been probed
    pub async fn snapshot(&self, url: &str) -> Option<SiteState> {
        let slot = self.sites.lock().await.get(url).cloned()?;
        let state = slot.lock().await.clone();
        Some(state)
    }

    pub async fn len(&self) -> usize {
        self.sites.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
