//! Configuration for the rolling file sinks
//!
//! This module provides the options consumed by
//! [`SizeRollingFileSink`](crate::rolling::SizeRollingFileSink) and
//! [`HourlyRollingFileSink`](crate::rolling::HourlyRollingFileSink).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default size limit per file (1 GiB)
pub const DEFAULT_SIZE_LIMIT_BYTES: u64 = 1024 * 1024 * 1024;

/// Configuration options for a rolling file series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct RollingConfig {
    /// Directory the series is written to; hourly series add a per-day level
    pub directory: PathBuf,
    /// Prefix of every file name in the series
    pub file_prefix: String,
    /// A size-rotated file is replaced once it grows past this many bytes
    pub size_limit_bytes: u64,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "log".to_string(),
            size_limit_bytes: DEFAULT_SIZE_LIMIT_BYTES,
        }
    }
}

impl RollingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory the series is written to
    pub fn with_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.directory = path.as_ref().to_path_buf();
        self
    }

    /// Set the file name prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Set the size limit per file in bytes
    pub fn with_size_limit_bytes(mut self, bytes: u64) -> Self {
        self.size_limit_bytes = bytes;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(Error::config("Directory must not be empty"));
        }

        if self.file_prefix.is_empty() {
            return Err(Error::config("File prefix must not be empty"));
        }

        if self.file_prefix.contains(['/', '\\']) {
            return Err(Error::config(format!(
                "File prefix must not contain path separators: {}",
                self.file_prefix
            )));
        }

        if self.size_limit_bytes < 1 {
            return Err(Error::config("Size limit must be at least 1 byte"));
        }

        Ok(())
    }

    /// Create a human-readable string representation of the configuration
    pub fn to_string_pretty(&self) -> String {
        let mut result = String::new();

        result.push_str("=== Rolling File Configuration ===\n\n");
        result.push_str(&format!("  Directory: {:?}\n", self.directory));
        result.push_str(&format!("  File Prefix: {}\n", self.file_prefix));
        result.push_str(&format!("  Size Limit: {} bytes\n", self.size_limit_bytes));

        result
    }

    /// Parse configuration from a JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
