//! Name-only import/export of the default field order.
//!
//! The exchange format drops flags entirely; importing merges names back
//! onto the current list so that known fields keep their flags.

pub mod names;

pub use names::{export_names, import_names, NameListDocument, TransferError, EXPORT_FILE_NAME};
