pub mod actors;
pub mod alerts;
pub mod config;
pub mod lifecycle;
pub mod monitors;
pub mod setup;
pub mod storage;
pub mod telegram;
pub mod transport;
pub mod util;

use serde::Deserialize;

/// A monitored endpoint. Identity is the url.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Target {
    pub url: String,
    pub name: String,
}

impl Target {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }
}
