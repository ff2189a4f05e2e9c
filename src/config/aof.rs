//! Append-only file configuration module.
//!
//! This module defines the persistence section of the configuration document:
//! the durability schedule and the log location.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ConfigResult, Validate};
use crate::aof::FsyncPolicy;
use crate::error::config::ConfigError;

/// Append-only file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AofConfig {
    /// Durability schedule: -1 off, 1 always, 2 every second.
    pub fsync: FsyncPolicy,

    /// Path of the log file.
    pub filename: PathBuf,
}

impl Default for AofConfig {
    fn default() -> Self {
        Self {
            // Persistence is opt-in, matching a fresh in-memory deployment.
            fsync: FsyncPolicy::Off,
            filename: PathBuf::from("./aof.log"),
        }
    }
}

impl Validate for AofConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.fsync.enabled() && self.filename.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "aof.filename must be set when fsync is enabled".to_string(),
            ));
        }
        Ok(())
    }
}
