//! Default field entries and their display flags.
//!
//! An [`EntryList`] is an ordered sequence of [`FieldEntry`] values whose names
//! are non-empty and unique.  The order is significant: it is the order in
//! which the schematic editor attaches default fields to new symbols.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building an [`EntryList`] from raw entries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    /// An entry has an empty (or whitespace-only) name.
    #[error("field name at position {index} is empty")]
    EmptyName { index: usize },

    /// Two entries share the same name.
    #[error("duplicate field name {name:?}")]
    DuplicateName { name: String },
}

/// One recognized display flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// The field value is shown on the schematic canvas.
    Visible,
    /// The field value is rendered as a hyperlink.
    Url,
}

impl Flag {
    /// All flags in canonical serialization order.
    pub const ALL: [Flag; 2] = [Flag::Visible, Flag::Url];

    /// Returns the bare token used for this flag in the structured text.
    pub fn token(self) -> &'static str {
        match self {
            Flag::Visible => "visible",
            Flag::Url => "url",
        }
    }

    /// Maps a bare token back to a flag, or `None` if it is not recognized.
    pub fn from_token(token: &str) -> Option<Flag> {
        Flag::ALL.into_iter().find(|flag| flag.token() == token)
    }
}

/// The combination of recognized display flags attached to an entry.
///
/// The two flags are independent: `url` without `visible` is a valid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FlagSet {
    pub visible: bool,
    pub has_url: bool,
}

impl FlagSet {
    /// No flags set.
    pub const NONE: FlagSet = FlagSet {
        visible: false,
        has_url: false,
    };

    pub const fn new(visible: bool, has_url: bool) -> Self {
        Self { visible, has_url }
    }

    /// Flags given to entries that have no previous flags (added or imported
    /// names): visible, no URL.
    pub const fn for_new_entry() -> Self {
        Self {
            visible: true,
            has_url: false,
        }
    }

    pub fn contains(&self, flag: Flag) -> bool {
        match flag {
            Flag::Visible => self.visible,
            Flag::Url => self.has_url,
        }
    }

    /// Sets `flag`, returning `false` if it was already set.
    pub fn insert(&mut self, flag: Flag) -> bool {
        let was_set = self.contains(flag);
        match flag {
            Flag::Visible => self.visible = true,
            Flag::Url => self.has_url = true,
        }
        !was_set
    }

    /// Iterates over the set flags in canonical order (`visible`, then `url`).
    pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
        Flag::ALL.into_iter().filter(|flag| self.contains(*flag))
    }

    pub fn is_empty(&self) -> bool {
        !self.visible && !self.has_url
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let tokens: Vec<&str> = self.iter().map(Flag::token).collect();
        f.write_str(&tokens.join(" "))
    }
}

/// A single named default field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: String,
    pub flags: FlagSet,
}

impl FieldEntry {
    pub fn new(name: impl Into<String>, flags: FlagSet) -> Self {
        Self {
            name: name.into(),
            flags,
        }
    }
}

/// Ordered list of default fields with unique, non-empty names.
///
/// The only ways to obtain an `EntryList` are [`EntryList::new`] (empty) and
/// [`EntryList::from_entries`] (validated), so holders can rely on the
/// uniqueness invariant without re-checking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryList {
    entries: Vec<FieldEntry>,
}

impl EntryList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `entries` and wraps them in a list, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::EmptyName`] for a blank name and
    /// [`EntryError::DuplicateName`] for the first repeated name.
    pub fn from_entries(entries: Vec<FieldEntry>) -> Result<Self, EntryError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(EntryError::EmptyName { index });
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(EntryError::DuplicateName {
                    name: entry.name.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FieldEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldEntry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// Iterates over entry names in list order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Returns the entry named `name`, if present.
    pub fn find(&self, name: &str) -> Option<&FieldEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Returns the index of the entry named `name`, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    pub fn into_entries(self) -> Vec<FieldEntry> {
        self.entries
    }

    // ── Invariant-preserving mutation (used by `OrderStore`) ──────────────────
    //
    // Index arguments are checked by the caller.

    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
    }

    pub(crate) fn relocate(&mut self, from: usize, to: usize) {
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
    }

    pub(crate) fn push(&mut self, entry: FieldEntry) -> Result<(), EntryError> {
        if entry.name.trim().is_empty() {
            return Err(EntryError::EmptyName {
                index: self.entries.len(),
            });
        }
        if self.position(&entry.name).is_some() {
            return Err(EntryError::DuplicateName { name: entry.name });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub(crate) fn remove(&mut self, index: usize) -> FieldEntry {
        self.entries.remove(index)
    }

    pub(crate) fn set_flags(&mut self, index: usize, flags: FlagSet) {
        self.entries[index].flags = flags;
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a FieldEntry;
    type IntoIter = std::slice::Iter<'a, FieldEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
