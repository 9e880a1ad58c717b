//! Alert message rendering
//!
//! Alerts are rendered from a template per [`AlertKind`]. Templates come from the configuration
//! and fall back to the built-in defaults below. The following placeholders are substituted:
//!
//! ```text
//! {{name}}      target name
//! {{url}}       target url
//! {{error}}     probe failure message (down alerts)
//! {{time}}      local time of the failure (down alerts)
//! {{downtime}}  pre-formatted downtime (recovery alerts)
//! ```
//!
//! Every occurrence is replaced in a single pass, so substituted values are never scanned again.
//! A field without a value renders as the empty string, unknown `{{...}}` tokens stay as they are.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::Templates;

pub const DEFAULT_DOWN_TEMPLATE: &str = "🔴 **DOWN ALERT**\n\nWebsite: {{name}} ({{url}})\nStatus: **DOWN**\nError: {{error}}\nTime: {{time}}";

pub const DEFAULT_UP_TEMPLATE: &str =
    "✅ **RECOVERY ALERT**\n\nWebsite: {{name}} ({{url}})\nStatus: **UP**\nDowntime: {{downtime}}";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(name|url|error|time|downtime)\}\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Down,
    Up,
}

/// Values available to a template
#[derive(Debug, Clone, Default)]
pub struct AlertData {
    pub name: String,
    pub url: String,
    pub error: Option<String>,
    pub time: Option<String>,
    pub downtime: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MessageFormatter {
    templates: Templates,
}

impl MessageFormatter {
    pub fn new(templates: Templates) -> Self {
        Self { templates }
    }

    /// The template used for `kind`, after fallback
    pub fn template(&self, kind: AlertKind) -> &str {
        let (custom, default) = match kind {
            AlertKind::Down => (&self.templates.down, DEFAULT_DOWN_TEMPLATE),
            AlertKind::Up => (&self.templates.up, DEFAULT_UP_TEMPLATE),
        };

        custom
            .as_deref()
            .filter(|template| !template.is_empty())
            .unwrap_or(default)
    }

    pub fn render(&self, kind: AlertKind, data: &AlertData) -> String {
        substitute(self.template(kind), data)
    }
}

fn substitute(template: &str, data: &AlertData) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "name" => data.name.clone(),
            "url" => data.url.clone(),
            "error" => data.error.clone().unwrap_or_default(),
            "time" => data.time.clone().unwrap_or_default(),
            "downtime" => data.downtime.clone().unwrap_or_default(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}
