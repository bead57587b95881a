use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Counters kept by a rolling sink
#[derive(Debug)]
pub struct SinkMetrics {
    /// Number of events written
    events_written: AtomicU64,
    /// Number of bytes written by successful emits
    bytes_written: AtomicU64,
    /// Number of emits that returned an error
    emit_failures: AtomicU64,
    /// Number of files opened, the first one included
    files_opened: AtomicU64,
    /// Number of times the current file was replaced
    rotations: AtomicU64,
    /// Number of candidate files skipped because another writer held them
    candidates_skipped: AtomicU64,
    /// Total time spent in successful emits, in nanoseconds
    emit_duration_ns: AtomicU64,

    /// Start time of the metrics collector
    start_time: Instant,
}

/// Point-in-time copy of [`SinkMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub events_written: u64,
    pub bytes_written: u64,
    pub emit_failures: u64,
    pub files_opened: u64,
    pub rotations: u64,
    pub candidates_skipped: u64,
    pub avg_emit_duration_ns: u64,
    pub uptime_secs: u64,
}

impl Default for SinkMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SinkMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            events_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            emit_failures: AtomicU64::new(0),
            files_opened: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            candidates_skipped: AtomicU64::new(0),
            emit_duration_ns: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a successful emit of `bytes` bytes
    pub fn record_event(&self, duration: Duration, bytes: u64) {
        self.events_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
        self.emit_duration_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record a failed emit
    pub fn record_failure(&self) {
        self.emit_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a newly opened file and the candidates skipped to reach it
    pub fn record_file_opened(&self, skipped: u64) {
        self.files_opened.fetch_add(1, Ordering::Relaxed);
        self.candidates_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    /// Record the replacement of the current file
    pub fn record_rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of events written
    pub fn events_written(&self) -> u64 {
        self.events_written.load(Ordering::Relaxed)
    }

    /// Get the number of bytes written
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    /// Get the number of rotations
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    /// Take a snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        let events_written = self.events_written.load(Ordering::Relaxed);
        let total_ns = self.emit_duration_ns.load(Ordering::Relaxed);

        MetricsSnapshot {
            events_written,
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            emit_failures: self.emit_failures.load(Ordering::Relaxed),
            files_opened: self.files_opened.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            candidates_skipped: self.candidates_skipped.load(Ordering::Relaxed),
            avg_emit_duration_ns: if events_written > 0 {
                total_ns / events_written
            } else {
                0
            },
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}
