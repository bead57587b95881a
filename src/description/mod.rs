//! Log file descriptions
//!
//! A description is an immutable value naming the physical file a sink
//! targets. Each description can derive its own file name and the next
//! candidate in its series without touching the filesystem.

mod hourly;
mod size;

pub use hourly::HourlyLogFile;
pub use size::SizeLimitedLogFile;

/// Extension of every file written by the sinks
pub(crate) const LOG_EXTENSION: &str = "log";

/// Naming and sequencing policy shared by the description variants
pub trait LogFileDescription: Clone + Send + Sync {
    /// File name for the current state, unique within the series
    fn file_name(&self) -> String;

    /// Successor in the series; never equal to `self`
    fn next(&self) -> Self;
}
