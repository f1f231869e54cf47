//! # fieldorder-core
//!
//! Shared library for editing the schematic editor's ordered list of default
//! fields: the structured-text codec, the in-memory ordering model, and the
//! name-only import/export format.
//!
//! This crate performs no file-system access.  Reading and writing the host
//! configuration file (backup, atomic replace) lives in `fieldorder-cli`.
//!
//! # Architecture overview (for beginners)
//!
//! The schematic editor keeps a list of "default fields" (e.g. `MPN`,
//! `MANUFACTURER`) that it attaches to every newly placed symbol.  The list is
//! stored inside the editor's `eeschema.json` as a parenthesized expression:
//!
//! ```text
//! (templatefields (field (name "MPN") visible) (field (name "DATASHEET") url))
//! ```
//!
//! The order of the `(field …)` blocks is the order the editor shows the
//! fields in.  This crate defines:
//!
//! - **`domain`** – The data model (`FieldEntry`, `FlagSet`, `EntryList`) and
//!   the `OrderStore`, which reorders entries and tracks unsaved changes.
//!
//! - **`codec`** – Turns fragment text into an `EntryList` and back, and
//!   splices a re-serialized fragment into the surrounding file text without
//!   touching anything else (`ConfigDocument`).
//!
//! - **`transfer`** – Converts between an `EntryList` and a plain list of
//!   names (`{ "fields": [...] }`), merging flags on import.

pub mod codec;
pub mod domain;
pub mod transfer;

// Re-export the most-used types at the crate root so callers can write
// `fieldorder_core::EntryList` instead of `fieldorder_core::domain::entry::EntryList`.
pub use codec::document::{ConfigDocument, FragmentEncoding};
pub use codec::fields::{parse, serialize};
pub use codec::CodecError;
pub use domain::entry::{EntryError, EntryList, FieldEntry, Flag, FlagSet};
pub use domain::order::{OrderError, OrderStore};
pub use transfer::names::{export_names, import_names, TransferError};
