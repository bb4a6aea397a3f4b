//! Shared application plumbing for the letloose command-line driver.

pub mod demo;
pub mod report;

use anyhow::{Context, Result};
use letloose_core::ControllerConfig;
use std::fs;
use std::path::Path;

pub use demo::{RunOptions, RunSummary, run_scripted};

/// Read a JSON controller config, falling back to defaults for omitted fields.
pub fn load_config(path: &Path) -> Result<ControllerConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let mut de = serde_json::Deserializer::from_str(&text);
    let config: ControllerConfig = serde_path_to_error::deserialize(&mut de).map_err(
        |err: serde_path_to_error::Error<serde_json::Error>| {
            anyhow::anyhow!("{} at {}", err.inner(), err.path())
        },
    )?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}
