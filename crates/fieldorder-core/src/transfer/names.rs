//! Conversions between an [`EntryList`] and a plain list of names.
//!
//! Exchange file shape:
//! ```json
//! { "fields": ["MPN", "MANUFACTURER", "DATASHEET"] }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::entry::{EntryList, FieldEntry, FlagSet};

/// Default file name for exported orders.
pub const EXPORT_FILE_NAME: &str = "default_fields_order.json";

/// Errors raised by import/export conversions.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The imported name list contains the same name twice.
    #[error("duplicate field name {name:?} in imported list")]
    DuplicateName { name: String },

    /// The imported name list contains an empty name.
    #[error("imported field name at position {index} is empty")]
    EmptyName { index: usize },

    /// The import document is not `{ "fields": [string, ...] }`.
    #[error("invalid import file: {0}")]
    ImportFormat(String),

    /// The export document could not be encoded.
    #[error("failed to encode export document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// On-disk exchange document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameListDocument {
    pub fields: Vec<String>,
}

impl NameListDocument {
    pub fn from_list(list: &EntryList) -> Self {
        Self {
            fields: export_names(list),
        }
    }

    /// Encodes the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, TransferError> {
        serde_json::to_string_pretty(self).map_err(TransferError::Encode)
    }

    /// Decodes an exchange document.
    ///
    /// Unknown extra keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::ImportFormat`] for malformed JSON, a missing
    /// `fields` key, or non-string elements.
    pub fn from_json(text: &str) -> Result<Self, TransferError> {
        serde_json::from_str(text).map_err(|e| TransferError::ImportFormat(e.to_string()))
    }
}

/// Returns the names of `list` in order, flags dropped.
///
/// # Examples
///
/// ```rust
/// use fieldorder_core::{export_names, EntryList, FieldEntry, FlagSet};
///
/// let list = EntryList::from_entries(vec![
///     FieldEntry::new("A", FlagSet::new(true, false)),
///     FieldEntry::new("B", FlagSet::NONE),
/// ]).unwrap();
/// assert_eq!(export_names(&list), vec!["A", "B"]);
/// ```
pub fn export_names(list: &EntryList) -> Vec<String> {
    list.names().map(str::to_owned).collect()
}

/// Builds a new list ordered like `names`.
///
/// Names already present in `existing` keep their flags; new names get
/// [`FlagSet::for_new_entry`].  Entries of `existing` that are not named are
/// dropped.
///
/// # Errors
///
/// Returns [`TransferError::DuplicateName`] if `names` repeats a name and
/// [`TransferError::EmptyName`] for a blank name.
pub fn import_names(names: &[String], existing: &EntryList) -> Result<EntryList, TransferError> {
    let mut seen = HashSet::with_capacity(names.len());
    let mut entries = Vec::with_capacity(names.len());
    let mut reused = 0usize;

    for (index, name) in names.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(TransferError::EmptyName { index });
        }
        if !seen.insert(name.as_str()) {
            return Err(TransferError::DuplicateName { name: name.clone() });
        }
        let flags = match existing.find(name) {
            Some(entry) => {
                reused += 1;
                entry.flags
            }
            None => FlagSet::for_new_entry(),
        };
        entries.push(FieldEntry::new(name.clone(), flags));
    }

    debug!(
        imported = entries.len(),
        reused,
        dropped = existing.len() - reused,
        "merged imported field names"
    );

    EntryList::from_entries(entries).map_err(|e| TransferError::ImportFormat(e.to_string()))
}
