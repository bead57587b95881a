//! # rollfile
//!
//! Append-safe log files with size and hourly rotation.
//!
//! Events are rendered by an injected [`TextFormatter`] and appended to the
//! current file, which is flushed after every event. Two rotation policies
//! are provided:
//!
//! - **Size**: a flat series `prefix-YYYYMMDD-NNNNN.log`. A file that grows
//!   past the limit is replaced by the next sequence number. Files held
//!   exclusively by another writer are skipped, so independent processes can
//!   share one directory without coordination.
//! - **Hourly**: `root/YYYY-MM-DD/prefix-HH.log`, one file per wall-clock hour.
//!
//! The building blocks are usable on their own: [`description`] holds the
//! naming policy, [`sink`] the single-file sinks, and [`rolling`] the
//! orchestrators that replace a sink when its file is done.
//!
//! ```no_run
//! use std::sync::Arc;
//! use rollfile::{Level, LogEvent, PlainTextFormatter, RollingConfig, SizeRollingFileSink};
//!
//! let config = RollingConfig::new()
//!     .with_directory("/var/log/myapp")
//!     .with_file_prefix("myapp")
//!     .with_size_limit_bytes(10 * 1024 * 1024);
//!
//! let sink = SizeRollingFileSink::open(config, Arc::new(PlainTextFormatter::new()))?;
//! sink.emit(&LogEvent::new(Level::Info, "service started"))?;
//! sink.dispose()?;
//! # Ok::<(), rollfile::Error>(())
//! ```

pub mod config;
pub mod description;
pub mod error;
pub mod event;
pub mod format;
pub mod fs;
pub mod metrics;
pub mod rolling;
pub mod sink;

#[cfg(test)]
mod testing;

pub use config::RollingConfig;
pub use description::{HourlyLogFile, LogFileDescription, SizeLimitedLogFile};
pub use error::{Error, Result};
pub use event::{Level, LogEvent};
pub use format::{JsonFormatter, PlainTextFormatter, TextFormatter};
pub use fs::{AppendStream, FileSystem, OsFileSystem};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use rolling::{Clock, FixedClock, HourlyRollingFileSink, SizeRollingFileSink, SystemClock};
pub use sink::{FileSink, HourlyFileSink, SizeLimitedFileSink};
