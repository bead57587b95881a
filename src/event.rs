//! Log events accepted by the file sinks
//!
//! An event is already fully populated by the time it reaches a sink; the
//! sink only hands it to a [`TextFormatter`](crate::format::TextFormatter).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Very fine grained diagnostics
    Trace,
    /// Internal diagnostics
    Debug,
    /// Normal operation
    Info,
    /// Something unexpected that was recovered from
    Warn,
    /// A failed operation
    Error,
    /// The process cannot continue
    Fatal,
}

impl Default for Level {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Level {
    /// Parse a level from a string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" | "verbose" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" | "information" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            _ => Err(Error::invalid_argument(format!("Unknown level: {}", s))),
        }
    }

    /// Get the name of the level
    pub fn name(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    /// Three letter upper case code used by the plain text layout
    pub fn short_code(&self) -> &'static str {
        match self {
            Self::Trace => "TRC",
            Self::Debug => "DBG",
            Self::Info => "INF",
            Self::Warn => "WRN",
            Self::Error => "ERR",
            Self::Fatal => "FTL",
        }
    }
}

/// A single, already captured log event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// When the event happened
    pub timestamp: DateTime<Utc>,
    /// Severity
    pub level: Level,
    /// Rendered message
    pub message: String,
    /// Structured properties attached to the event
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl LogEvent {
    /// Create a new event stamped with the current time
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self::at(Utc::now(), level, message)
    }

    /// Create a new event with an explicit timestamp
    pub fn at(timestamp: DateTime<Utc>, level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Attach a structured property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// An event without a message carries nothing to write
    pub fn is_blank(&self) -> bool {
        self.message.is_empty()
    }

    /// Reject blank events before any I/O is attempted
    pub(crate) fn ensure_present(&self) -> Result<()> {
        if self.is_blank() {
            return Err(Error::invalid_argument("log event has no message"));
        }
        Ok(())
    }
}
