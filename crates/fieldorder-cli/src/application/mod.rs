//! Application layer use cases for the field-order tool.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The application layer sits between the pure logic in `fieldorder_core`
//! (codec, ordering, name-list merge) and the command line in `main.rs`.
//! A use case here:
//!
//! - **Orchestrates** core types to fulfil one user goal ("move MPN to the
//!   top and save").
//! - **Reaches the disk only through the `FileStore` trait**, so tests can
//!   run every use case against an in-memory store.
//!
//! # Sub-modules
//!
//! - **`edit_session`** – Opens the host configuration file, applies reorder
//!   and import operations, exports the name list, and saves with a backup.

pub mod edit_session;
