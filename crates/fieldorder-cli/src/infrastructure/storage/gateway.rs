//! Loading and saving the host configuration file.
//!
//! # Save sequence
//!
//! ```text
//! 1. splice the re-serialized fragment into the loaded document
//! 2. copy the file as it is on disk right now  ──►  eeschema.json.bak  (synced)
//! 3. write the new content                     ──►  eeschema.json.<uuid>.tmp (synced)
//!    and give it the original file's permissions
//! 4. rename the temp file over                 ──►  eeschema.json
//! ```
//!
//! If step 2 fails nothing else is attempted.  If step 3 or 4 fails the temp
//! file is removed.  In both cases the original file was never opened for
//! writing, so it is byte-identical to what it was before the call.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use fieldorder_core::{CodecError, ConfigDocument, EntryList};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::fs::{FileStore, LocalFileStore};

/// Suffix appended to the host file name for the backup copy.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Errors raised while loading or saving the host configuration file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The host configuration file does not exist.
    #[error("configuration file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The host configuration file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was read but its default field list could not be decoded.
    #[error("{}: {source}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// The backup copy could not be written; the original was not touched.
    #[error("failed to write backup {}: {source}", path.display())]
    BackupWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The new content could not be put in place; the original is unchanged.
    #[error("failed to save {} (original left unchanged): {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a successful [`PersistenceGateway::save`].
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// The document as now stored on disk.
    pub document: ConfigDocument,
    /// Where the pre-save copy was written.
    pub backup_path: PathBuf,
    /// `true` when the file content actually changed, so the schematic editor
    /// must be restarted to pick up the new order.
    pub restart_required: bool,
}

/// Reads and writes the host configuration file through a [`FileStore`].
#[derive(Debug, Clone, Default)]
pub struct PersistenceGateway<S = LocalFileStore> {
    store: S,
}

impl<S: FileStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads `path`, locates the fragment and parses the entry list.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`], [`StorageError::Read`], or
    /// [`StorageError::Codec`] wrapping the parse failure.
    pub fn load(&self, path: &Path) -> Result<(ConfigDocument, EntryList), StorageError> {
        let content = self.store.read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StorageError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                StorageError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let codec_err = |source| StorageError::Codec {
            path: path.to_path_buf(),
            source,
        };
        let document = ConfigDocument::from_content(content).map_err(codec_err)?;
        let entries = document.entries().map_err(codec_err)?;

        info!(path = %path.display(), fields = entries.len(), "loaded default field list");
        Ok((document, entries))
    }

    /// Writes `entries` into `path`: backup first, then an atomic replace.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Codec`] if the fragment cannot be re-encoded.
    /// - [`StorageError::Read`] if the current file exists but is unreadable.
    /// - [`StorageError::BackupWrite`] if the backup copy fails.
    /// - [`StorageError::Save`] if writing or renaming the temp file fails.
    pub fn save(
        &self,
        path: &Path,
        document: &ConfigDocument,
        entries: &EntryList,
    ) -> Result<SaveOutcome, StorageError> {
        let updated = document
            .with_entries(entries)
            .map_err(|source| StorageError::Codec {
                path: path.to_path_buf(),
                source,
            })?;

        // The backup is the file as it is on disk now; if it has disappeared
        // since loading, fall back to the loaded text.
        let previous = match self.store.read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "configuration file vanished since load; backing up loaded copy");
                document.content().to_string()
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let backup = backup_path(path);
        self.store
            .write_synced(&backup, previous.as_bytes())
            .map_err(|source| StorageError::BackupWrite {
                path: backup.clone(),
                source,
            })?;
        debug!(backup = %backup.display(), "wrote backup");

        self.replace_atomically(path, updated.content())?;

        let restart_required = previous != updated.content();
        info!(
            path = %path.display(),
            fields = entries.len(),
            restart_required,
            "saved default field list"
        );
        Ok(SaveOutcome {
            document: updated,
            backup_path: backup,
            restart_required,
        })
    }

    fn replace_atomically(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        let temp = temp_path(path);
        let result = self
            .store
            .write_synced(&temp, content.as_bytes())
            .and_then(|()| self.keep_permissions(path, &temp))
            .and_then(|()| self.store.rename(&temp, path));

        if let Err(source) = result {
            if self.store.exists(&temp) {
                if let Err(e) = self.store.remove(&temp) {
                    warn!(temp = %temp.display(), "failed to remove temp file: {e}");
                }
            }
            return Err(StorageError::Save {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(())
    }

    /// The replaced file keeps the original's mode.
    fn keep_permissions(&self, original: &Path, temp: &Path) -> io::Result<()> {
        if self.store.exists(original) {
            self.store.copy_permissions(original, temp)
        } else {
            Ok(())
        }
    }
}

/// Returns `path` with [`BACKUP_SUFFIX`] appended (`eeschema.json.bak`).
pub fn backup_path(path: &Path) -> PathBuf {
    with_appended(path, BACKUP_SUFFIX)
}

/// Unique sibling temp path (`eeschema.json.<uuid>.tmp`), in the same
/// directory so the final rename never crosses file systems.
fn temp_path(path: &Path) -> PathBuf {
    with_appended(path, &format!(".{}.tmp", Uuid::new_v4().simple()))
}

fn with_appended(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
