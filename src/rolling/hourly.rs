use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::RollingConfig;
use crate::description::HourlyLogFile;
use crate::error::{Error, Result};
use crate::event::LogEvent;
use crate::format::TextFormatter;
use crate::metrics::SinkMetrics;
use crate::rolling::{emit_rolling, Clock, SystemClock};
use crate::sink::{FileSink, HourlyFileSink};

struct RollingState {
    sink: Option<HourlyFileSink>,
    disposed: bool,
}

/// Keeps an hourly series going: one file per wall-clock hour under
/// `directory/YYYY-MM-DD/`
///
/// The hour is checked on every emit; the first emit of a new hour closes the
/// previous file and opens the next one. The size limit of the configuration
/// is not used.
pub struct HourlyRollingFileSink {
    config: RollingConfig,
    formatter: Arc<dyn TextFormatter>,
    clock: Arc<dyn Clock>,
    state: Mutex<RollingState>,
    metrics: SinkMetrics,
}

impl HourlyRollingFileSink {
    /// Name reported by [`Error::Disposed`]
    pub const OBJECT_NAME: &'static str = "HourlyRollingFileSink";

    /// Create a series using the system clock
    pub fn open(config: RollingConfig, formatter: Arc<dyn TextFormatter>) -> Result<Self> {
        Self::new(config, formatter, Arc::new(SystemClock))
    }

    /// Create a series with an explicit clock
    pub fn new(
        config: RollingConfig,
        formatter: Arc<dyn TextFormatter>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let rolling = Self {
            config,
            formatter,
            clock,
            state: Mutex::new(RollingState {
                sink: None,
                disposed: false,
            }),
            metrics: SinkMetrics::new(),
        };

        let description = HourlyLogFile::for_time(rolling.config.file_prefix.as_str(), rolling.clock.now());
        let sink = rolling.open_sink(description)?;
        tracing::debug!(path = %sink.path().display(), "opened hourly log file");
        rolling.state.lock().sink = Some(sink);

        Ok(rolling)
    }

    /// Write `event` to the file of the current hour
    pub fn emit(&self, event: &LogEvent) -> Result<()> {
        let mut state = self.state.lock();

        if state.disposed {
            return Err(Error::disposed(Self::OBJECT_NAME));
        }

        let now = self.clock.now();
        let stale = match state.sink.as_ref() {
            Some(sink) => !sink.description().covers(now),
            None => true,
        };

        let roll = if stale {
            Some(|| self.open_sink(HourlyLogFile::for_time(self.config.file_prefix.as_str(), now)))
        } else {
            None
        };

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

    /// Get the configuration
    pub fn config(&self) -> &RollingConfig {
        &self.config
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    fn open_sink(&self, description: HourlyLogFile) -> Result<HourlyFileSink> {
        let sink = HourlyFileSink::new(Arc::clone(&self.formatter), &self.config.directory, description)?;
        self.metrics.record_file_opened(0);
        Ok(sink)
    }
}
