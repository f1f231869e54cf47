//! In-memory ordering model driven by the user interface.
//!
//! [`OrderStore`] owns the live [`EntryList`] plus a *baseline* copy captured
//! when the list was loaded (or last saved).  Reorder operations only change
//! positions; the set of names stays the same.  Edits that do change the set
//! of names (`add`, `remove`, `replace`) are separate operations.
//!
//! # Dirty tracking (for beginners)
//!
//! The UI needs to know whether there is anything to save.  Rather than
//! keeping a "modified" flag that every operation must remember to set, the
//! store compares the current list with the baseline.  Moving an entry down
//! and back up again therefore leaves the store clean.

use thiserror::Error;
use tracing::debug;

use crate::domain::entry::{EntryError, EntryList, FieldEntry, FlagSet};

/// Errors returned by [`OrderStore`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// An index argument is outside `[0, len)`.
    #[error("index {index} is out of range for a list of {len} fields")]
    IndexOutOfRange { index: usize, len: usize },

    /// The name being added already exists in the list.
    #[error("a field named {name:?} already exists")]
    DuplicateName { name: String },

    /// The name being added is empty after trimming.
    #[error("field name must not be empty")]
    EmptyName,
}

impl From<EntryError> for OrderError {
    fn from(e: EntryError) -> Self {
        match e {
            EntryError::EmptyName { .. } => OrderError::EmptyName,
            EntryError::DuplicateName { name } => OrderError::DuplicateName { name },
        }
    }
}

/// Holds the live order of default fields and the baseline it started from.
#[derive(Debug, Clone)]
pub struct OrderStore {
    current: EntryList,
    baseline: EntryList,
}

impl OrderStore {
    /// Creates a store whose baseline is `initial`.
    pub fn new(initial: EntryList) -> Self {
        Self {
            baseline: initial.clone(),
            current: initial,
        }
    }

    /// Returns the live ordered list.
    pub fn current_order(&self) -> &EntryList {
        &self.current
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Returns `true` iff the order or any flags differ from the baseline.
    pub fn is_dirty(&self) -> bool {
        self.current != self.baseline
    }

    /// Makes the current list the new baseline.  Call after a successful save.
    pub fn mark_saved(&mut self) {
        self.baseline = self.current.clone();
    }

    /// Returns the index of the entry named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.current.position(name)
    }

    /// Swaps the entry at `index` with its predecessor.
    ///
    /// Returns `Ok(false)` without changing anything when `index` is 0.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::IndexOutOfRange`] if `index >= len`.
    pub fn move_up(&mut self, index: usize) -> Result<bool, OrderError> {
        self.check_index(index)?;
        if index == 0 {
            return Ok(false);
        }
        self.current.swap(index, index - 1);
        debug!(from = index, to = index - 1, "moved field up");
        Ok(true)
    }

    /// Swaps the entry at `index` with its successor.
    ///
    /// Returns `Ok(false)` without changing anything when `index` is the last
    /// position.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::IndexOutOfRange`] if `index >= len`.
    pub fn move_down(&mut self, index: usize) -> Result<bool, OrderError> {
        self.check_index(index)?;
        if index + 1 == self.current.len() {
            return Ok(false);
        }
        self.current.swap(index, index + 1);
        debug!(from = index, to = index + 1, "moved field down");
        Ok(true)
    }

    /// Removes the entry at `index` and reinserts it so that it ends up at
    /// `new_index`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::IndexOutOfRange`] if either index is `>= len`.
    pub fn move_to(&mut self, index: usize, new_index: usize) -> Result<(), OrderError> {
        self.check_index(index)?;
        self.check_index(new_index)?;
        if index != new_index {
            self.current.relocate(index, new_index);
            debug!(from = index, to = new_index, "moved field");
        }
        Ok(())
    }

    /// Appends a new entry named `name` (trimmed) with default flags and
    /// returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyName`] or [`OrderError::DuplicateName`].
    pub fn add(&mut self, name: &str) -> Result<usize, OrderError> {
        let name = name.trim();
        self.current
            .push(FieldEntry::new(name, FlagSet::for_new_entry()))?;
        debug!(name, "added field");
        Ok(self.current.len() - 1)
    }

    /// Removes and returns the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::IndexOutOfRange`] if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Result<FieldEntry, OrderError> {
        self.check_index(index)?;
        let removed = self.current.remove(index);
        debug!(name = %removed.name, "removed field");
        Ok(removed)
    }

    /// Replaces the flags of the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::IndexOutOfRange`] if `index >= len`.
    pub fn set_flags(&mut self, index: usize, flags: FlagSet) -> Result<(), OrderError> {
        self.check_index(index)?;
        self.current.set_flags(index, flags);
        Ok(())
    }

    /// Installs a whole new list (e.g. the result of an import).  The
    /// baseline is kept, so the store becomes dirty if the list differs.
    pub fn replace(&mut self, list: EntryList) {
        self.current = list;
    }

    fn check_index(&self, index: usize) -> Result<(), OrderError> {
        let len = self.current.len();
        if index < len {
            Ok(())
        } else {
            Err(OrderError::IndexOutOfRange { index, len })
        }
    }
}
