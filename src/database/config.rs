//! Database configuration
//!
//! Loaded from a JSON file:
//!
//! ```json
//! { "data_dir": "./emberdb_data", "sync_writes": true, "log_level": "info" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event, Severity};

use super::errors::{DatabaseError, DatabaseResult};

/// Configuration for one database instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Data directory (required)
    pub data_dir: String,

    /// fsync after every append (default true)
    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_sync_writes() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DatabaseConfig {
    /// Creates a config for `data_dir` with every other setting at its default
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            sync_writes: default_sync_writes(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> DatabaseResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DatabaseError::Config(format!("Failed to read config: {}", e)))?;

        let config: DatabaseConfig = serde_json::from_str(&content)
            .map_err(|e| DatabaseError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let path_str = path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("path", path_str.as_str()),
                ("data_dir", config.data_dir.as_str()),
            ],
        );

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> DatabaseResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(DatabaseError::Config("data_dir must not be empty".into()));
        }

        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> DatabaseResult<Severity> {
        self.log_level
            .parse::<Severity>()
            .map_err(|e| DatabaseError::Config(format!("Invalid log_level: {}", e)))
    }

    /// Data directory as a path
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}
