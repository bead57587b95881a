use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::description::HourlyLogFile;
use crate::error::{Error, Result};
use crate::event::LogEvent;
use crate::format::TextFormatter;
use crate::fs::open_exclusive_append;
use crate::sink::writer::SinkWriter;
use crate::sink::FileSink;

/// Writes the file for one hour of one day
///
/// Files live at `root/YYYY-MM-DD/<file name>`. The hour-scoped name is
/// unique per process, so opening does not retry: any failure is returned.
pub struct HourlyFileSink {
    description: HourlyLogFile,
    path: PathBuf,
    writer: SinkWriter,
}

impl HourlyFileSink {
    /// Name reported by [`Error::Disposed`]
    pub const OBJECT_NAME: &'static str = "HourlyFileSink";

    /// Create the day directory under `root` if needed and open the hour file
    pub fn new(
        formatter: Arc<dyn TextFormatter>,
        root: impl AsRef<Path>,
        description: HourlyLogFile,
    ) -> Result<Self> {
        let directory = description.directory(root.as_ref());
        if !directory.is_dir() {
            fs::create_dir_all(&directory).map_err(|e| Error::file(&directory, e))?;
        }

        let path = description.path(root.as_ref());
        let file = open_exclusive_append(&path).map_err(|e| Error::file(&path, e))?;

        Ok(Self {
            description,
            path,
            writer: SinkWriter::new(Self::OBJECT_NAME, formatter, Box::new(file)),
        })
    }

    /// Get the description of the open file
    pub fn description(&self) -> &HourlyLogFile {
        &self.description
    }

    /// Check if the sink has been disposed
    pub fn is_disposed(&self) -> bool {
        self.writer.is_disposed()
    }
}

impl FileSink for HourlyFileSink {
    fn emit(&self, event: &LogEvent) -> Result<()> {
        self.writer.emit(event, |_| Ok(()))
    }

    fn dispose(&self) -> Result<()> {
        self.writer.dispose()
    }

    fn bytes_written(&self) -> u64 {
        self.writer.bytes_written()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
