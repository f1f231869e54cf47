//! Reads and writes the `{ "fields": [...] }` exchange files.

use std::path::{Path, PathBuf};

use fieldorder_core::transfer::NameListDocument;
use fieldorder_core::{EntryList, TransferError};
use thiserror::Error;
use tracing::info;

use crate::infrastructure::storage::fs::FileStore;

#[derive(Debug, Error)]
pub enum TransferFileError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a valid exchange document.
    #[error("{}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: TransferError,
    },
}

/// Writes the names of `list` to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`TransferFileError::Write`] on I/O failure.
pub fn write_export<S: FileStore>(
    store: &S,
    path: &Path,
    list: &EntryList,
) -> Result<(), TransferFileError> {
    let document = NameListDocument::from_list(list);
    let mut json = document.to_json().map_err(|source| TransferFileError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');

    store
        .write_synced(path, json.as_bytes())
        .map_err(|source| TransferFileError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), fields = list.len(), "exported field order");
    Ok(())
}

/// Reads the ordered name list from `path`.
///
/// # Errors
///
/// Returns [`TransferFileError::Read`] if the file cannot be read and
/// [`TransferFileError::Format`] wrapping [`TransferError::ImportFormat`] if
/// it is not `{ "fields": [string, ...] }`.
pub fn read_import<S: FileStore>(store: &S, path: &Path) -> Result<Vec<String>, TransferFileError> {
    let text = store
        .read_to_string(path)
        .map_err(|source| TransferFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let document = NameListDocument::from_json(&text).map_err(|source| TransferFileError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), fields = document.fields.len(), "read field order for import");
    Ok(document.fields)
}
