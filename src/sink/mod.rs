//! File sinks
//!
//! A file sink owns exactly one open file for its whole lifetime and writes
//! formatted events to it, one flushed append at a time. Deciding when to
//! move on to another file is left to the caller; see [`crate::rolling`].
//!
//! Two variants exist:
//!
//! - [`SizeLimitedFileSink`] writes one file of a sequenced series, skips
//!   candidates held by other writers, and raises a sticky flag once the file
//!   grows past its size limit.
//! - [`HourlyFileSink`] writes the file for one hour inside a per-day
//!   directory and never looks at sizes.

mod hourly;
mod size_limited;
mod writer;

pub use hourly::HourlyFileSink;
pub use size_limited::SizeLimitedFileSink;

use std::path::Path;

use crate::error::Result;
use crate::event::LogEvent;

/// Capabilities shared by both sink variants
pub trait FileSink: Send + Sync {
    /// Format `event` into the file and flush it
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`](crate::Error::InvalidArgument) for a blank
    ///   event, before any I/O
    /// - [`Error::Disposed`](crate::Error::Disposed) once the sink has been
    ///   disposed
    /// - [`Error::Io`](crate::Error::Io) if formatting or flushing fails; the
    ///   sink remains usable
    fn emit(&self, event: &LogEvent) -> Result<()>;

    /// Flush and close the file. Calling it again does nothing.
    fn dispose(&self) -> Result<()>;

    /// Returns `true` once the caller should move to the next file
    fn rotation_due(&self) -> bool {
        false
    }

    /// Bytes this sink has written to its file
    fn bytes_written(&self) -> u64;

    /// Path of the open file
    fn path(&self) -> &Path;
}
