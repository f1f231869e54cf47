//! File-system abstraction used by the persistence gateway.
//!
//! # Testability
//!
//! The [`FileStore`] trait lets tests run the full save sequence against an
//! in-memory store ([`super::mock::MemoryFileStore`]) and inject failures at
//! any step, without touching the real disk.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// The handful of file operations the save sequence needs.
#[cfg_attr(test, mockall::automock)]
pub trait FileStore {
    /// Reads the whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Creates or truncates `path`, writes `contents`, and flushes them to
    /// stable storage before returning.
    fn write_synced(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Renames `from` to `to`, replacing `to` if it exists.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Deletes `path`.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Gives `to` the same permissions as `from`.
    fn copy_permissions(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// [`FileStore`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_synced(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn copy_permissions(&self, from: &Path, to: &Path) -> io::Result<()> {
        let permissions = fs::metadata(from)?.permissions();
        fs::set_permissions(to, permissions)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
