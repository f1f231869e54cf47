//! Structured-text codec for the default field list.
//!
//! Fragment grammar:
//! ```text
//! fragment := "(" "templatefields" field* ")"
//! field    := "(" "field" "(" "name" STRING ")" flag* ")"
//! flag     := "visible" | "url"
//! ```
//! Tokens may be separated by any amount of whitespace, including none.
//! Strings are double-quoted; `\"` and `\\` are the escapes.

pub mod document;
pub mod fields;
pub mod tokens;

use thiserror::Error;

use crate::domain::entry::EntryError;

/// Errors that can occur while locating, parsing or encoding the fragment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Neither a `"field_names"` string value nor a `(templatefields` marker
    /// was found.
    #[error("default field list not found: no \"field_names\" value or (templatefields marker")]
    FragmentNotFound,

    /// A `(field …)` block (or the list around it) does not follow the grammar.
    #[error("malformed field entry at offset {offset}: {reason}")]
    MalformedEntry { offset: usize, reason: String },

    /// Two entries share a name.
    #[error("duplicate field name {name:?}")]
    DuplicateName { name: String },

    /// The JSON string literal holding the fragment could not be decoded or
    /// encoded.
    #[error("invalid field_names string literal: {reason}")]
    BadStringLiteral { reason: String },
}

impl CodecError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        CodecError::MalformedEntry {
            offset,
            reason: reason.into(),
        }
    }
}

impl From<EntryError> for CodecError {
    fn from(e: EntryError) -> Self {
        match e {
            EntryError::EmptyName { index } => CodecError::MalformedEntry {
                offset: 0,
                reason: format!("entry {index} has an empty name"),
            },
            EntryError::DuplicateName { name } => CodecError::DuplicateName { name },
        }
    }
}
