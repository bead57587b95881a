//! Filesystem access for the file sinks
//!
//! The size-limited sink only reaches the disk through [`FileSystem`], so its
//! open-with-retry path can be exercised against an in-memory double. The
//! hourly sink binds to [`open_exclusive_append`] directly.
//!
//! Exclusive append means: the file is created if missing, every write goes
//! to the end, readers are never blocked, and a second writer asking for the
//! same exclusivity is refused with an error that [`is_contention`]
//! recognises.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// A writable byte stream that can report its current length
pub trait AppendStream: Write + Send {
    /// Length of the underlying file in bytes, including data written
    /// before it was opened
    fn length(&self) -> io::Result<u64>;
}

impl AppendStream for File {
    fn length(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

/// Directory and file capabilities needed by the size-limited sink
pub trait FileSystem: Send + Sync {
    /// Returns `true` if `path` exists and is a directory
    fn directory_exists(&self, path: &Path) -> bool;

    /// Creates `path` together with any missing parents
    fn create_directory(&self, path: &Path) -> io::Result<()>;

    /// Opens `path` for exclusive append
    ///
    /// # Errors
    ///
    /// Returns an error satisfying [`is_contention`] when another writer
    /// already holds the file, and any other I/O error unchanged.
    fn open_for_append(&self, path: &Path) -> io::Result<Box<dyn AppendStream>>;

    /// Lists the names of the regular files directly inside `path`
    fn list_directory(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// [`FileSystem`] backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl OsFileSystem {
    /// Create a new OS filesystem handle
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for OsFileSystem {
    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_directory(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn open_for_append(&self, path: &Path) -> io::Result<Box<dyn AppendStream>> {
        let file = open_exclusive_append(path)?;
        Ok(Box::new(file))
    }

    fn list_directory(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        Ok(names)
    }
}

/// Open `path` for append, creating it if needed, as the only writer
///
/// On Unix the exclusivity is an advisory `flock`, which never blocks
/// readers. The lock lives as long as the returned handle.
#[cfg(not(windows))]
pub fn open_exclusive_append(path: &Path) -> io::Result<File> {
    use fs2::FileExt;

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    file.try_lock_exclusive()?;
    Ok(file)
}

/// Open `path` for append, creating it if needed, as the only writer
///
/// On Windows the handle is opened with `FILE_SHARE_READ` only, so a second
/// writer fails with a sharing violation while readers are still admitted.
#[cfg(windows)]
pub fn open_exclusive_append(path: &Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_SHARE_READ: u32 = 0x0000_0001;

    OpenOptions::new()
        .create(true)
        .append(true)
        .share_mode(FILE_SHARE_READ)
        .open(path)
}

/// Returns `true` if `err` means the file is held exclusively by another
/// writer, as opposed to a failure that retrying cannot fix
pub fn is_contention(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    let code = match err.raw_os_error() {
        Some(code) => code,
        None => return false,
    };

    if fs2::lock_contended_error().raw_os_error() == Some(code) {
        return true;
    }

    // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
    cfg!(windows) && matches!(code, 32 | 33)
}
