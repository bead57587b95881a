use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::config::RollingConfig;
use crate::description::SizeLimitedLogFile;
use crate::error::{Error, Result};
use crate::event::LogEvent;
use crate::format::TextFormatter;
use crate::fs::{FileSystem, OsFileSystem};
use crate::metrics::SinkMetrics;
use crate::rolling::{emit_rolling, Clock, SystemClock};
use crate::sink::{FileSink, SizeLimitedFileSink};

struct RollingState {
    sink: Option<SizeLimitedFileSink>,
    disposed: bool,
}

/// Keeps a size-limited series going: one file at a time, a new one when the
/// current file is full or the day changes
///
/// On creation the series resumes at the highest sequence already present
/// for today. Rotation happens lazily on the emit that follows the one which
/// pushed the file over its limit, so no empty file is left behind.
pub struct SizeRollingFileSink {
    config: RollingConfig,
    formatter: Arc<dyn TextFormatter>,
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    state: Mutex<RollingState>,
    metrics: SinkMetrics,
}

impl SizeRollingFileSink {
    /// Name reported by [`Error::Disposed`]
    pub const OBJECT_NAME: &'static str = "SizeRollingFileSink";

    /// Create a series on the local filesystem using the system clock
    pub fn open(config: RollingConfig, formatter: Arc<dyn TextFormatter>) -> Result<Self> {
        Self::new(config, formatter, Arc::new(OsFileSystem::new()), Arc::new(SystemClock))
    }

    /// Create a series with explicit filesystem and clock
    pub fn new(
        config: RollingConfig,
        formatter: Arc<dyn TextFormatter>,
        fs: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let rolling = Self {
            config,
            formatter,
            fs,
            clock,
            state: Mutex::new(RollingState {
                sink: None,
                disposed: false,
            }),
            metrics: SinkMetrics::new(),
        };

        let today = rolling.clock.now().date();
        let start = rolling.resume_point(today)?;
        let sink = rolling.open_sink(start)?;
        tracing::debug!(
            path = %sink.path().display(),
            size_limit_bytes = rolling.config.size_limit_bytes,
            "opened size-rolling log file"
        );
        rolling.state.lock().sink = Some(sink);

        Ok(rolling)
    }

    /// Write `event` to the current file, rotating first if needed
    pub fn emit(&self, event: &LogEvent) -> Result<()> {
        let mut state = self.state.lock();

        if state.disposed {
            return Err(Error::disposed(Self::OBJECT_NAME));
        }

        let today = self.clock.now().date();

        // Some(None) resumes the series for today, Some(Some(full)) moves past
        // a file that has grown past its limit
        let roll = match state.sink.as_ref() {
            Some(sink) if sink.description().date() == today => {
                if sink.rotation_due() {
                    Some(Some(sink.description().clone()))
                } else {
                    None
                }
            }
            _ => Some(None),
        };

        let roll = roll.map(|full: Option<SizeLimitedLogFile>| {
            move || {
                let next = match full {
                    Some(full) => full.try_next()?,
                    None => self.resume_point(today)?,
                };
                self.open_sink(next)
            }
        });

        emit_rolling(&self.metrics, &mut state.sink, roll, event)
    }

    /// Close the current file; later emits fail with [`Error::Disposed`]
    pub fn dispose(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.disposed = true;

        match state.sink.take() {
            Some(sink) => sink.dispose(),
            None => Ok(()),
        }
    }

    /// Path of the file currently being written
    pub fn current_path(&self) -> Option<PathBuf> {
        self.state.lock().sink.as_ref().map(|sink| sink.path().to_path_buf())
    }

    /// Description of the file currently being written
    pub fn current_description(&self) -> Option<SizeLimitedLogFile> {
        self.state.lock().sink.as_ref().map(|sink| sink.description().clone())
    }

    /// Get the configuration
    pub fn config(&self) -> &RollingConfig {
        &self.config
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    /// Highest existing file of `date`, or the first sequence if there is none
    fn resume_point(&self, date: NaiveDate) -> Result<SizeLimitedLogFile> {
        let prefix = &self.config.file_prefix;
        let directory = &self.config.directory;
        let first = SizeLimitedLogFile::first(prefix.as_str(), date);

        if !self.fs.directory_exists(directory) {
            return Ok(first);
        }

        let names = self
            .fs
            .list_directory(directory)
            .map_err(|e| Error::file(directory, e))?;

        let latest = names
            .iter()
            .filter_map(|name| SizeLimitedLogFile::parse(prefix, name))
            .filter(|description| description.date() == date)
            .max_by_key(|description| description.sequence());

        Ok(latest.unwrap_or(first))
    }

    fn open_sink(&self, description: SizeLimitedLogFile) -> Result<SizeLimitedFileSink> {
        let sink = SizeLimitedFileSink::new(
            Arc::clone(&self.formatter),
            &self.config.directory,
            description,
            self.config.size_limit_bytes,
            self.fs.as_ref(),
        )?;

        if sink.skipped_candidates() > 0 {
            tracing::debug!(
                skipped = sink.skipped_candidates(),
                path = %sink.path().display(),
                "skipped log files held by other writers"
            );
        }
        self.metrics.record_file_opened(sink.skipped_candidates());

        Ok(sink)
    }
}
