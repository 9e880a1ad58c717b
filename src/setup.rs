//! Scaffolding of local configuration files from the shipped examples

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

/// Files created by `sitewatch setup`, as (example, target) pairs
pub const SCAFFOLD_FILES: [(&str, &str); 2] = [
    (".env.example", ".env"),
    ("config.example.json", "config.json"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Created,
    AlreadyExists,
    MissingSource,
}

/// Copy `source` to `target` inside `dir`, never overwriting an existing target
pub fn copy_if_missing(dir: &Path, source: &str, target: &str) -> anyhow::Result<SetupOutcome> {
    let source_path = dir.join(source);
    let target_path = dir.join(target);

    if target_path.exists() {
        warn!("{target} already exists, skipping");
        return Ok(SetupOutcome::AlreadyExists);
    }

    if !source_path.exists() {
        warn!("source file {source} not found");
        return Ok(SetupOutcome::MissingSource);
    }

    std::fs::copy(&source_path, &target_path)
        .with_context(|| format!("could not create {target} from {source}"))?;
    info!("created {target} from {source}");

    Ok(SetupOutcome::Created)
}

pub fn scaffold(dir: &Path) -> anyhow::Result<Vec<(&'static str, SetupOutcome)>> {
    SCAFFOLD_FILES
        .iter()
        .map(|(source, target)| Ok((*target, copy_if_missing(dir, source, target)?)))
        .collect()
}
