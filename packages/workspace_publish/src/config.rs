//! Optional `.workspace_publish.toml` configuration.
//!
//! ```toml
//! registry = "crates-io"
//! allow_dirty = false
//! exclude = ["rivus-sqlx-macros"]
//! timeout_secs = 600
//! extra_args = ["--no-verify"]
//! ```
//!
//! Command line flags take precedence over the file. The file is found
//! through the workspace root, so `timeout_secs` applies to the publish
//! commands only; the `cargo metadata` query that locates the root runs with
//! the `--timeout` flag or the default.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the workspace root
pub const CONFIG_FILE_NAME: &str = ".workspace_publish.toml";

/// Shortest accepted per-command timeout, in seconds
pub const MIN_TIMEOUT_SECS: u64 = 30;
/// Longest accepted per-command timeout, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Check a per-command timeout against the accepted range
pub fn check_timeout(secs: u64) -> std::result::Result<(), String> {
    if secs < MIN_TIMEOUT_SECS {
        return Err(format!(
            "Timeout cannot be less than {} seconds",
            MIN_TIMEOUT_SECS
        ));
    }
    if secs > MAX_TIMEOUT_SECS {
        return Err(format!(
            "Timeout cannot exceed 1 hour ({} seconds)",
            MAX_TIMEOUT_SECS
        ));
    }
    Ok(())
}

/// Settings read from the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Registry to publish to
    pub registry: Option<String>,
    /// Pass `--allow-dirty` to cargo publish
    pub allow_dirty: Option<bool>,
    /// Packages never visited
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Per-command timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Extra arguments appended to every cargo publish
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl FileConfig {
    /// Parse and check a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(secs) = config.timeout_secs {
            check_timeout(secs).map_err(|reason| ConfigError::InvalidValue {
                path: path.to_path_buf(),
                key: "timeout_secs",
                reason,
            })?;
        }

        Ok(config)
    }

    /// Resolve the config for a run.
    ///
    /// An explicit path must exist. Without one, `CONFIG_FILE_NAME` in
    /// `workspace_root` is used when present, and defaults otherwise.
    pub fn discover(explicit: Option<&Path>, workspace_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
                .into());
            }
            return Self::load(path);
        }

        let default_path: PathBuf = workspace_root.join(CONFIG_FILE_NAME);
        if default_path.is_file() {
            log::debug!("loading config from {}", default_path.display());
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }
}
