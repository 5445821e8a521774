//! Manager configuration (`tmplview.config.json`).
//!
//! ```json
//! {
//!   "base_path": "templates",
//!   "caching": true,
//!   "strict_mode": true
//! }
//! ```
//!
//! Every field is optional; missing fields take the defaults shown by [`ManagerConfig::default`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, TmplviewError};

/// Default config file name looked up by the CLI.
pub const CONFIG_FILE: &str = "tmplview.config.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Directory every logical path is resolved against.
    pub base_path: PathBuf,
    /// Keep compiled fragments for the manager's lifetime. Enable in production.
    pub caching: bool,
    /// Fail rendering when a template references a field missing from the data.
    pub strict_mode: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("templates"),
            caching: false,
            strict_mode: true,
        }
    }
}

impl ManagerConfig {
    /// Read and parse a config file. A missing file is an error; callers that want the defaults
    /// check for the file first.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| config_err(path, e))?;
        serde_json::from_str(&contents).map_err(|e| config_err(path, e))
    }
}

fn config_err(path: &Path, e: impl std::error::Error + Send + Sync + 'static) -> TmplviewError {
    TmplviewError::Config {
        path: path.to_path_buf(),
        source: Box::new(e),
    }
}
