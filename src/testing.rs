//! In-memory filesystem doubles for unit tests

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::fs::{AppendStream, FileSystem};

#[derive(Default)]
struct StreamShared {
    data: Mutex<Vec<u8>>,
    flushes: AtomicUsize,
    closes: AtomicUsize,
}

/// Observer side of an in-memory file
#[derive(Clone, Default)]
pub(crate) struct MemoryStream {
    shared: Arc<StreamShared>,
}

impl MemoryStream {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Open a writing handle; dropping it counts as one close
    pub(crate) fn open(&self) -> Box<dyn AppendStream> {
        Box::new(MemoryWriter {
            shared: Arc::clone(&self.shared),
        })
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.shared.data.lock()).into_owned()
    }

    pub(crate) fn flushes(&self) -> usize {
        self.shared.flushes.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }
}

struct MemoryWriter {
    shared: Arc<StreamShared>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.shared.data.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.shared.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl AppendStream for MemoryWriter {
    fn length(&self) -> io::Result<u64> {
        Ok(self.shared.data.lock().len() as u64)
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.shared.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// [`FileSystem`] double with scriptable contention and failures
#[derive(Default)]
pub(crate) struct MemoryFileSystem {
    directories: Mutex<HashSet<PathBuf>>,
    files: Mutex<HashMap<PathBuf, MemoryStream>>,
    held: Mutex<HashSet<PathBuf>>,
    failing: Mutex<HashMap<PathBuf, io::ErrorKind>>,
    attempts: Mutex<Vec<PathBuf>>,
}

impl MemoryFileSystem {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Pretend another writer holds `path` exclusively
    pub(crate) fn hold(&self, path: impl Into<PathBuf>) {
        self.held.lock().insert(path.into());
    }

    /// Fail every open of `path` with `kind`
    pub(crate) fn fail(&self, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        self.failing.lock().insert(path.into(), kind);
    }

    /// Add an existing file with some content
    pub(crate) fn seed(&self, path: impl Into<PathBuf>, contents: &str) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.directories.lock().insert(parent.to_path_buf());
        }
        let stream = MemoryStream::new();
        stream.shared.data.lock().extend_from_slice(contents.as_bytes());
        self.files.lock().insert(path, stream);
    }

    pub(crate) fn file(&self, path: impl AsRef<Path>) -> Option<MemoryStream> {
        self.files.lock().get(path.as_ref()).cloned()
    }

    /// Every path passed to `open_for_append`, in order
    pub(crate) fn attempts(&self) -> Vec<PathBuf> {
        self.attempts.lock().clone()
    }
}

impl FileSystem for MemoryFileSystem {
    fn directory_exists(&self, path: &Path) -> bool {
        self.directories.lock().contains(path)
    }

    fn create_directory(&self, path: &Path) -> io::Result<()> {
        if let Some(kind) = self.failing.lock().get(path) {
            return Err(io::Error::new(*kind, "directory creation failed"));
        }
        self.directories.lock().insert(path.to_path_buf());
        Ok(())
    }

    fn open_for_append(&self, path: &Path) -> io::Result<Box<dyn AppendStream>> {
        self.attempts.lock().push(path.to_path_buf());

        if let Some(kind) = self.failing.lock().get(path) {
            return Err(io::Error::new(*kind, "open failed"));
        }
        if self.held.lock().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "file is held by another writer",
            ));
        }

        let mut files = self.files.lock();
        let stream = files.entry(path.to_path_buf()).or_default();
        Ok(stream.open())
    }

    fn list_directory(&self, path: &Path) -> io::Result<Vec<String>> {
        if let Some(kind) = self.failing.lock().get(path) {
            return Err(io::Error::new(*kind, "listing failed"));
        }
        let files = self.files.lock();
        let names = files
            .keys()
            .filter(|file| file.parent() == Some(path))
            .filter_map(|file| file.file_name()?.to_str().map(str::to_string))
            .collect();
        Ok(names)
    }
}
