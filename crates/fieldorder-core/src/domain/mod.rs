//! Domain entities for default field ordering.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What lives here? (for beginners)
//!
//! - [`entry`] defines what a default field *is*: a unique name plus a small
//!   set of display flags.  [`entry::EntryList`] is the ordered collection
//!   and refuses duplicate or empty names at construction time, so every
//!   list that exists in memory is already valid.
//! - [`order`] defines what the user can *do* with the list: move entries
//!   around, add and remove them, and ask whether anything changed since the
//!   last save.
//!
//! Nothing here reads files or parses text.  The codec and the storage layer
//! depend on these types, never the other way round.

pub mod entry;
pub mod order;
