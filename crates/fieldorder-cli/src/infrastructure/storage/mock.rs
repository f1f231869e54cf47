//! In-memory file store for testing.
//!
//! Allows tests to run load/save against a fake disk and to make individual
//! steps (backup write, temp write, rename) fail on demand.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::fs::FileStore;

#[derive(Debug, Clone)]
enum Fault {
    /// Writing exactly this path fails.
    WriteTo(PathBuf),
    /// Writing any path with this extension fails.
    WriteExtension(String),
    /// Every rename fails.
    Rename,
}

/// Unix-style mode given to files created by a write.
pub const DEFAULT_MODE: u32 = 0o644;

/// A [`FileStore`] that keeps files in a map.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: Mutex<HashMap<PathBuf, String>>,
    modes: Mutex<HashMap<PathBuf, u32>>,
    faults: Mutex<Vec<Fault>>,
}

impl MemoryFileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one file.
    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let store = Self::new();
        store.insert(path, contents);
        store
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), contents.into());
    }

    /// Returns the current contents of `path`, if it exists.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).get(path).cloned()
    }

    /// Sets the permission bits of `path`.
    pub fn set_mode(&self, path: impl Into<PathBuf>, mode: u32) {
        self.modes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), mode);
    }

    /// Permission bits of `path`, if it exists.
    pub fn mode(&self, path: &Path) -> Option<u32> {
        if !self.exists(path) {
            return None;
        }
        let modes = self.modes.lock().unwrap_or_else(PoisonError::into_inner);
        Some(modes.get(path).copied().unwrap_or(DEFAULT_MODE))
    }

    /// Returns every stored path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }

    /// Makes every write to `path` fail.
    pub fn fail_write_to(&self, path: impl Into<PathBuf>) {
        self.push_fault(Fault::WriteTo(path.into()));
    }

    /// Makes every write to a path ending in `.{extension}` fail.
    pub fn fail_write_with_extension(&self, extension: &str) {
        self.push_fault(Fault::WriteExtension(extension.to_string()));
    }

    /// Makes every rename fail.
    pub fn fail_rename(&self) {
        self.push_fault(Fault::Rename);
    }

    fn push_fault(&self, fault: Fault) {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner).push(fault);
    }

    fn write_fails(&self, path: &Path) -> bool {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|fault| match fault {
                Fault::WriteTo(p) => p == path,
                Fault::WriteExtension(ext) => {
                    path.extension().and_then(|e| e.to_str()) == Some(ext.as_str())
                }
                Fault::Rename => false,
            })
    }

    fn rename_fails(&self) -> bool {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|fault| matches!(fault, Fault::Rename))
    }
}

fn injected(op: &str, path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("injected {op} failure for {}", path.display()),
    )
}

impl FileStore for MemoryFileStore {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.contents(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })
    }

    fn write_synced(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if self.write_fails(path) {
            return Err(injected("write", path));
        }
        let text = String::from_utf8(contents.to_vec())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.insert(path, text);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.rename_fails() {
            return Err(injected("rename", from));
        }
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        let contents = files.remove(from).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", from.display()))
        })?;
        files.insert(to.to_path_buf(), contents);

        let mut modes = self.modes.lock().unwrap_or_else(PoisonError::into_inner);
        match modes.remove(from) {
            Some(mode) => modes.insert(to.to_path_buf(), mode),
            None => modes.remove(to),
        };
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.modes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
            })
    }

    fn copy_permissions(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mode = self.mode(from).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", from.display()))
        })?;
        if !self.exists(to) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", to.display()),
            ));
        }
        self.set_mode(to, mode);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).contains_key(path)
    }
}
