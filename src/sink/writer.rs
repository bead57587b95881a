//! Write protocol shared by the file sinks
//!
//! Every emit runs under one mutex: disposed check, format, flush, then an
//! optional post-flush inspection of the stream. An event is formatted into a
//! scratch buffer first and reaches the stream only if formatting succeeded.
//! Dispose flushes and closes the stream exactly once.

use std::io::{BufWriter, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::event::LogEvent;
use crate::format::TextFormatter;
use crate::fs::AppendStream;

/// State guarded by the sink mutex
struct WriterState {
    /// Open stream; taken on dispose
    output: Option<BufWriter<Box<dyn AppendStream>>>,
    /// Formatted bytes of the event in flight; empty between emits
    scratch: Vec<u8>,
    /// Bytes handed to the stream by successful emits
    bytes_written: u64,
    /// Set once by dispose, never cleared
    disposed: bool,
}

/// Owns one open stream and serialises all access to it
pub(crate) struct SinkWriter {
    /// Type name reported in [`Error::Disposed`]
    object: &'static str,
    formatter: Arc<dyn TextFormatter>,
    state: Mutex<WriterState>,
}

impl SinkWriter {
    /// Wrap an already opened stream
    pub(crate) fn new(
        object: &'static str,
        formatter: Arc<dyn TextFormatter>,
        stream: Box<dyn AppendStream>,
    ) -> Self {
        Self {
            object,
            formatter,
            state: Mutex::new(WriterState {
                output: Some(BufWriter::new(stream)),
                scratch: Vec::new(),
                bytes_written: 0,
                disposed: false,
            }),
        }
    }

    /// Format `event` into the stream and flush it
    ///
    /// `after_flush` runs while the lock is still held and sees the
    /// underlying stream with every byte of this event already handed to it.
    /// A formatter error leaves the stream untouched.
    pub(crate) fn emit<F>(&self, event: &LogEvent, after_flush: F) -> Result<()>
    where
        F: FnOnce(&dyn AppendStream) -> Result<()>,
    {
        event.ensure_present()?;

        let mut guard = self.state.lock();
        let state = &mut *guard;

        if state.disposed {
            return Err(Error::disposed(self.object));
        }

        let output = match state.output.as_mut() {
            Some(output) => output,
            None => return Ok(()),
        };

        state.scratch.clear();
        let formatted = self.formatter.format(event, &mut state.scratch);
        let written = formatted.and_then(|()| {
            output.write_all(&state.scratch)?;
            output.flush()
        });
        let length = state.scratch.len() as u64;
        state.scratch.clear();
        written?;

        state.bytes_written += length;
        after_flush(output.get_ref().as_ref())
    }

    /// Bytes written to the stream by successful emits
    pub(crate) fn bytes_written(&self) -> u64 {
        self.state.lock().bytes_written
    }

    /// Flush and close the stream; later calls do nothing
    pub(crate) fn dispose(&self) -> Result<()> {
        let mut state = self.state.lock();

        if state.disposed {
            return Ok(());
        }
        state.disposed = true;

        if let Some(mut output) = state.output.take() {
            output.flush()?;
            // Dropping the writer closes the file and releases its lock
        }

        Ok(())
    }

    /// Check if the writer has been disposed
    pub(crate) fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }
}

impl Drop for SinkWriter {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}
