//! CLI command implementations for tmplview.
//!
//! Each module corresponds to a subcommand (`tmplview <command>`).

pub mod bench;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tmplview_core::config::ManagerConfig;

/// Load `config_path` if it exists, then apply command-line overrides.
pub fn load_config(
    config_path: &Path,
    base_path: Option<&Path>,
    cache: bool,
) -> Result<ManagerConfig> {
    let mut config = if config_path.exists() {
        ManagerConfig::load(config_path)?
    } else {
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        ManagerConfig::default()
    };

    if let Some(base_path) = base_path {
        config.base_path = base_path.to_path_buf();
    }
    if cache {
        config.caching = true;
    }
    Ok(config)
}

/// Read render data from a JSON file; no file means an empty object.
pub fn load_data(path: Option<&Path>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Object(Default::default()));
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read data file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse data file {}", path.display()))
}
