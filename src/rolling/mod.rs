//! Rolling orchestrators
//!
//! A file sink writes exactly one file. The types here own "the current
//! sink" of a series and replace it when its file is done: when it has grown
//! past the size limit, when the day changes, or when the hour changes.
//! The outgoing sink is always disposed before the next one is opened.

mod clock;
mod hourly;
mod size;

pub use clock::{Clock, FixedClock, SystemClock};
pub use hourly::HourlyRollingFileSink;
pub use size::SizeRollingFileSink;

use std::time::Instant;

use crate::error::Result;
use crate::event::LogEvent;
use crate::metrics::SinkMetrics;
use crate::sink::FileSink;

/// Dispose a sink that is being rotated away
///
/// A failure to close the old file does not stop the rotation; it is logged
/// and the series moves on.
fn retire<S: FileSink>(sink: Option<S>) {
    if let Some(sink) = sink {
        if let Err(e) = sink.dispose() {
            tracing::warn!(
                path = %sink.path().display(),
                error = %e,
                "failed to close rotated log file"
            );
        }
    }
}

/// Write `event` to the current sink of a series, replacing the sink first
/// when `roll` is given
///
/// `roll` opens the next sink and only runs after the current one has been
/// retired. Every failure, opening included, counts as a failed emit.
fn emit_rolling<S, F>(
    metrics: &SinkMetrics,
    current: &mut Option<S>,
    roll: Option<F>,
    event: &LogEvent,
) -> Result<()>
where
    S: FileSink,
    F: FnOnce() -> Result<S>,
{
    if let Some(open) = roll {
        let previous = current.take();
        let had_previous = previous.is_some();
        retire(previous);

        let sink = match open() {
            Ok(sink) => sink,
            Err(e) => {
                metrics.record_failure();
                return Err(e);
            }
        };
        if had_previous {
            metrics.record_rotation();
        }
        tracing::debug!(path = %sink.path().display(), "rotated to new log file");
        *current = Some(sink);
    }

    let sink = match current.as_ref() {
        Some(sink) => sink,
        None => return Ok(()),
    };

    let before = sink.bytes_written();
    let start = Instant::now();
    match sink.emit(event) {
        Ok(()) => {
            let bytes = sink.bytes_written().saturating_sub(before);
            metrics.record_event(start.elapsed(), bytes);
            Ok(())
        }
        Err(e) => {
            metrics.record_failure();
            Err(e)
        }
    }
}
