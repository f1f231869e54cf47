//! Infrastructure layer for the field-order tool.
//!
//! Contains the file-system facing adapters: the host configuration
//! gateway, the host file locator, the tool settings file, and the
//! import/export file reader and writer.
//!
//! **Dependency rule**: this layer may depend on `fieldorder_core`, but MUST
//! NOT import from `application`.

pub mod storage;
pub mod transfer_file;
