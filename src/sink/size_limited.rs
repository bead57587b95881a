use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::description::{LogFileDescription, SizeLimitedLogFile};
use crate::error::{Error, Result};
use crate::event::LogEvent;
use crate::format::TextFormatter;
use crate::fs::{is_contention, AppendStream, FileSystem};
use crate::sink::writer::SinkWriter;
use crate::sink::FileSink;

/// Result of the open-with-retry search
struct OpenedFile {
    description: SizeLimitedLogFile,
    path: PathBuf,
    stream: Box<dyn AppendStream>,
    skipped: u64,
}

/// Writes one file of a size-rotated series
///
/// The sink never rotates by itself. After each [`emit`](FileSink::emit) the
/// owner polls [`limit_reached`](Self::limit_reached) and replaces the sink
/// once it turns `true`.
pub struct SizeLimitedFileSink {
    /// Description of the file actually opened
    description: SizeLimitedLogFile,
    path: PathBuf,
    size_limit_bytes: u64,
    /// Sticky; only ever set while the writer lock is held
    limit_reached: AtomicBool,
    /// Candidates skipped because another writer held them
    skipped_candidates: u64,
    writer: SinkWriter,
}

impl SizeLimitedFileSink {
    /// Name reported by [`Error::Disposed`]
    pub const OBJECT_NAME: &'static str = "SizeLimitedFileSink";

    /// Open the first available file of the series starting at `description`
    ///
    /// `directory` is created if it does not exist. Candidates held
    /// exclusively by another writer are skipped by advancing to
    /// [`next`](LogFileDescription::next) until one opens; every other
    /// failure is returned as [`Error::File`].
    pub fn new(
        formatter: Arc<dyn TextFormatter>,
        directory: impl AsRef<Path>,
        description: SizeLimitedLogFile,
        size_limit_bytes: u64,
        fs: &dyn FileSystem,
    ) -> Result<Self> {
        let opened = open_first_available(fs, directory.as_ref(), description)?;

        Ok(Self {
            description: opened.description,
            path: opened.path,
            size_limit_bytes,
            limit_reached: AtomicBool::new(false),
            skipped_candidates: opened.skipped,
            writer: SinkWriter::new(Self::OBJECT_NAME, formatter, opened.stream),
        })
    }

    /// Get the description of the file that was opened
    pub fn description(&self) -> &SizeLimitedLogFile {
        &self.description
    }

    /// Get the size limit in bytes
    pub fn size_limit_bytes(&self) -> u64 {
        self.size_limit_bytes
    }

    /// Returns `true` once the file has grown past the size limit
    pub fn limit_reached(&self) -> bool {
        self.limit_reached.load(Ordering::Acquire)
    }

    /// Number of held candidates skipped while opening
    pub fn skipped_candidates(&self) -> u64 {
        self.skipped_candidates
    }

    /// Check if the sink has been disposed
    pub fn is_disposed(&self) -> bool {
        self.writer.is_disposed()
    }
}

impl FileSink for SizeLimitedFileSink {
    fn emit(&self, event: &LogEvent) -> Result<()> {
        self.writer.emit(event, |stream| {
            if stream.length()? > self.size_limit_bytes {
                self.limit_reached.store(true, Ordering::Release);
            }
            Ok(())
        })
    }

    fn dispose(&self) -> Result<()> {
        self.writer.dispose()
    }

    fn bytes_written(&self) -> u64 {
        self.writer.bytes_written()
    }

    fn rotation_due(&self) -> bool {
        self.limit_reached()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

fn ensure_directory(fs: &dyn FileSystem, directory: &Path) -> Result<()> {
    if !fs.directory_exists(directory) {
        fs.create_directory(directory)
            .map_err(|e| Error::file(directory, e))?;
    }
    Ok(())
}

fn open_first_available(
    fs: &dyn FileSystem,
    directory: &Path,
    mut description: SizeLimitedLogFile,
) -> Result<OpenedFile> {
    ensure_directory(fs, directory)?;

    let mut skipped = 0;
    loop {
        let path = directory.join(description.file_name());

        match fs.open_for_append(&path) {
            Ok(stream) => {
                return Ok(OpenedFile {
                    description,
                    path,
                    stream,
                    skipped,
                })
            }
            Err(e) if is_contention(&e) => {
                description = description.try_next()?;
                skipped += 1;
            }
            Err(e) => return Err(Error::file(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Level;
    use crate::format::PlainTextFormatter;
    use crate::fs::{open_exclusive_append, OsFileSystem};
    use crate::testing::MemoryFileSystem;
    use chrono::NaiveDate;
    use std::fs;
    use std::io::{self, Write};
    use tempfile::tempdir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn message_formatter() -> Arc<dyn TextFormatter> {
        Arc::new(|event: &LogEvent, out: &mut dyn Write| writeln!(out, "{}", event.message))
    }

    fn event(message: &str) -> LogEvent {
        LogEvent::new(Level::Info, message)
    }

    #[test]
    fn test_creates_missing_directory() -> Result<()> {
        let fs = MemoryFileSystem::new();
        let dir = Path::new("/logs/app");

        let sink = SizeLimitedFileSink::new(
            message_formatter(),
            dir,
            SizeLimitedLogFile::first("app", date()),
            1024,
            &fs,
        )?;

        assert!(fs.directory_exists(dir));
        assert_eq!(sink.path(), dir.join("app-20240305-00001.log"));
        assert_eq!(sink.skipped_candidates(), 0);
        Ok(())
    }

    #[test]
    fn test_limit_reached_is_sticky() -> Result<()> {
        let fs = MemoryFileSystem::new();
        let dir = Path::new("/logs");
        let sink = SizeLimitedFileSink::new(
            message_formatter(),
            dir,
            SizeLimitedLogFile::first("app", date()),
            10,
            &fs,
        )?;

        // "12345\n" is 6 bytes: 6, then 12 > 10
        sink.emit(&event("12345"))?;
        assert!(!sink.limit_reached());
        assert!(!sink.rotation_due());

        sink.emit(&event("12345"))?;
        assert!(sink.limit_reached());

        sink.emit(&event("x"))?;
        assert!(sink.limit_reached());
        Ok(())
    }

    #[test]
    fn test_limit_is_strictly_greater() -> Result<()> {
        let fs = MemoryFileSystem::new();
        let sink = SizeLimitedFileSink::new(
            message_formatter(),
            "/logs",
            SizeLimitedLogFile::first("app", date()),
            6,
            &fs,
        )?;

        sink.emit(&event("12345"))?;
        assert!(!sink.limit_reached());
        Ok(())
    }

    #[test]
    fn test_existing_content_counts_towards_limit() -> Result<()> {
        let fs = MemoryFileSystem::new();
        fs.seed("/logs/app-20240305-00001.log", "previous run\n");

        let sink = SizeLimitedFileSink::new(
            message_formatter(),
            "/logs",
            SizeLimitedLogFile::first("app", date()),
            14,
            &fs,
        )?;
        sink.emit(&event("a"))?;
        assert!(sink.limit_reached());

        let file = fs.file("/logs/app-20240305-00001.log").unwrap();
        assert_eq!(file.contents(), "previous run\na\n");
        Ok(())
    }

    #[test]
    fn test_held_candidates_are_skipped() -> Result<()> {
        let fs = MemoryFileSystem::new();
        fs.hold("/logs/app-20240305-00003.log");
        fs.hold("/logs/app-20240305-00004.log");

        let sink = SizeLimitedFileSink::new(
            message_formatter(),
            "/logs",
            SizeLimitedLogFile::new("app", date(), 3),
            1024,
            &fs,
        )?;

        assert_eq!(sink.description().sequence(), 5);
        assert_eq!(sink.skipped_candidates(), 2);
        assert_eq!(
            fs.attempts(),
            vec![
                PathBuf::from("/logs/app-20240305-00003.log"),
                PathBuf::from("/logs/app-20240305-00004.log"),
                PathBuf::from("/logs/app-20240305-00005.log"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_exhausted_sequence_stops_the_search() {
        let fs = MemoryFileSystem::new();
        let last = SizeLimitedLogFile::new("app", date(), u64::MAX);
        fs.hold(Path::new("/logs").join(last.file_name()));

        let err = match SizeLimitedFileSink::new(message_formatter(), "/logs", last, 1024, &fs) {
            Ok(_) => panic!("no candidate exists past the last sequence"),
            Err(err) => err,
        };

        assert!(err.is_invalid_argument());
        assert_eq!(fs.attempts().len(), 1);
    }

    #[test]
    fn test_other_open_failures_are_fatal() {
        let fs = MemoryFileSystem::new();
        fs.fail("/logs/app-20240305-00001.log", io::ErrorKind::PermissionDenied);

        let err = match SizeLimitedFileSink::new(
            message_formatter(),
            "/logs",
            SizeLimitedLogFile::first("app", date()),
            1024,
            &fs,
        ) {
            Ok(_) => panic!("permission failure must not be retried"),
            Err(err) => err,
        };

        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
        assert_eq!(fs.attempts().len(), 1);
    }

    #[test]
    fn test_directory_creation_failure_is_fatal() {
        let fs = MemoryFileSystem::new();
        fs.fail("/readonly", io::ErrorKind::PermissionDenied);

        let result = SizeLimitedFileSink::new(
            message_formatter(),
            "/readonly",
            SizeLimitedLogFile::first("app", date()),
            1024,
            &fs,
        );

        assert!(matches!(result, Err(Error::File { ref path, .. }) if path == Path::new("/readonly")));
        assert!(fs.attempts().is_empty());
    }

    #[test]
    fn test_disposed_sink_rejects_emit() -> Result<()> {
        let fs = MemoryFileSystem::new();
        let sink = SizeLimitedFileSink::new(
            message_formatter(),
            "/logs",
            SizeLimitedLogFile::first("app", date()),
            1024,
            &fs,
        )?;
        let file = fs.file("/logs/app-20240305-00001.log").unwrap();

        sink.emit(&event("before"))?;
        sink.dispose()?;
        sink.dispose()?;
        assert!(sink.is_disposed());
        assert_eq!(file.closes(), 1);

        let err = sink.emit(&event("after")).unwrap_err();
        assert!(matches!(err, Error::Disposed { object: SizeLimitedFileSink::OBJECT_NAME }));
        assert_eq!(file.contents(), "before\n");
        Ok(())
    }

    #[test]
    fn test_blank_event_is_invalid_argument() -> Result<()> {
        let fs = MemoryFileSystem::new();
        let sink = SizeLimitedFileSink::new(
            message_formatter(),
            "/logs",
            SizeLimitedLogFile::first("app", date()),
            0,
            &fs,
        )?;
        let file = fs.file("/logs/app-20240305-00001.log").unwrap();

        let err = sink.emit(&event("")).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(file.flushes(), 0);
        assert!(!sink.limit_reached());
        Ok(())
    }

    #[test]
    fn test_zero_threshold_end_to_end() -> Result<()> {
        let temp_dir = tempdir()?;
        let fs = OsFileSystem::new();
        let sink = SizeLimitedFileSink::new(
            Arc::new(PlainTextFormatter::new()),
            temp_dir.path(),
            SizeLimitedLogFile::first("app", date()),
            0,
            &fs,
        )?;

        for message in ["first", "second", "third"] {
            sink.emit(&event(message))?;
            assert!(sink.limit_reached());
        }
        sink.dispose()?;

        let content = fs::read_to_string(temp_dir.path().join("app-20240305-00001.log"))?;
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("[INF] first"));
        assert!(lines[1].ends_with("[INF] second"));
        assert!(lines[2].ends_with("[INF] third"));
        Ok(())
    }

    #[test]
    fn test_real_file_held_by_competing_writer() -> Result<()> {
        let temp_dir = tempdir()?;
        let fs = OsFileSystem::new();

        let held = SizeLimitedLogFile::first("app", date());
        let _competitor = open_exclusive_append(&temp_dir.path().join(held.file_name()))?;

        let sink = SizeLimitedFileSink::new(
            message_formatter(),
            temp_dir.path(),
            held.clone(),
            1024,
            &fs,
        )?;

        assert_eq!(sink.description().sequence(), 2);
        sink.emit(&event("landed in the next file"))?;
        sink.dispose()?;

        let content = fs::read_to_string(temp_dir.path().join("app-20240305-00002.log"))?;
        assert_eq!(content, "landed in the next file\n");
        let untouched = fs::read_to_string(temp_dir.path().join(held.file_name()))?;
        assert!(untouched.is_empty());
        Ok(())
    }
}
