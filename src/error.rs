//! Error handling for rollfile
//!
//! This module provides the error type and result alias shared by the
//! descriptions, the file sinks and the rolling orchestrators.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in rollfile operations
#[derive(Error, Debug)]
pub enum Error {
    /// An argument was rejected before any I/O took place
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The sink was used after it had been disposed
    #[error("Cannot write to disposed file ({object})")]
    Disposed {
        /// Type name of the disposed object
        object: &'static str,
    },

    /// Opening a file or creating its directory failed
    #[error("File error for {path:?}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing, formatting or flushing an event failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for rollfile operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a new disposed-use error for the named object
    pub fn disposed(object: &'static str) -> Self {
        Self::Disposed { object }
    }

    /// Create a new file error
    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this error reports use of a disposed sink
    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::Disposed { .. })
    }

    /// Check if this is an I/O error, with or without a path attached
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_) | Self::File { .. })
    }

    /// Get the underlying I/O error kind, if any
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io(err) => Some(err.kind()),
            Self::File { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// Get a user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<String> {
        match self.io_kind() {
            Some(io::ErrorKind::PermissionDenied) => {
                Some("Verify permissions on the log directory".to_string())
            }
            Some(io::ErrorKind::NotFound) => {
                Some("The log directory or one of its parents does not exist".to_string())
            }
            _ => match self {
                Self::Disposed { .. } => {
                    Some("The sink was rotated away or shut down; write to the current sink".to_string())
                }
                Self::Config(_) => Some("Check the rolling file configuration values".to_string()),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::invalid_argument("event has no message");
        assert!(err.is_invalid_argument());
        assert!(!err.is_disposed());

        let err = Error::disposed("SizeLimitedFileSink");
        assert!(err.is_disposed());
        assert_eq!(err.to_string(), "Cannot write to disposed file (SizeLimitedFileSink)");

        let err = Error::file(
            "/var/log/app",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, Error::File { ref path, .. } if path == &PathBuf::from("/var/log/app")));
        assert!(err.is_io_error());
        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::Other, "disk full");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_io_error());
        assert!(!err.is_disposed());
    }

    #[test]
    fn test_error_suggestion() {
        let err = Error::file(
            "/var/log/app",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.suggestion().unwrap().contains("permissions"));

        let err = Error::disposed("HourlyFileSink");
        assert!(err.suggestion().unwrap().contains("current sink"));

        assert!(Error::invalid_argument("x").suggestion().is_none());
    }
}
