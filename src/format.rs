//! Event formatting
//!
//! Sinks never decide how an event looks on disk. They hold a shared
//! [`TextFormatter`] and ask it to render each event into the open stream.

use std::io::{self, Write};

use crate::event::LogEvent;

/// Renders one event into an output stream
///
/// Errors returned here propagate out of `emit` unchanged as
/// [`Error::Io`](crate::Error::Io).
pub trait TextFormatter: Send + Sync {
    /// Write `event` to `output`, including any trailing delimiter
    fn format(&self, event: &LogEvent, output: &mut dyn Write) -> io::Result<()>;
}

impl<F> TextFormatter for F
where
    F: Fn(&LogEvent, &mut dyn Write) -> io::Result<()> + Send + Sync,
{
    fn format(&self, event: &LogEvent, output: &mut dyn Write) -> io::Result<()> {
        self(event, output)
    }
}

/// One line per event: `2024-03-05 14:00:00.000 +00:00 [INF] message {props}`
#[derive(Debug, Clone, Default)]
pub struct PlainTextFormatter {
    include_properties: bool,
}

impl PlainTextFormatter {
    /// Create a formatter that writes the message only
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the structured properties as a JSON object after the message
    pub fn with_properties(mut self, include: bool) -> Self {
        self.include_properties = include;
        self
    }
}

impl TextFormatter for PlainTextFormatter {
    fn format(&self, event: &LogEvent, output: &mut dyn Write) -> io::Result<()> {
        write!(
            output,
            "{} [{}] {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S%.3f %:z"),
            event.level.short_code(),
            event.message
        )?;

        if self.include_properties && !event.properties.is_empty() {
            output.write_all(b" ")?;
            serde_json::to_writer(&mut *output, &event.properties)?;
        }

        output.write_all(b"\n")
    }
}

/// One JSON object per line
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl TextFormatter for JsonFormatter {
    fn format(&self, event: &LogEvent, output: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *output, event)?;
        output.write_all(b"\n")
    }
}
