//! EditSession: one load → edit → save cycle on the host configuration file.
//!
//! ```text
//! open()  ──► PersistenceGateway::load ──► OrderStore (baseline = loaded list)
//!   │
//!   ├─ order_mut().move_up / move_to / add / remove
//!   ├─ update_flags(index, visible, url)   omitted flags keep their value
//!   ├─ import_from(file)   names ──► import_names ──► OrderStore::replace
//!   ├─ export_to(file)     OrderStore ──► { "fields": [...] }
//!   │
//! save()  ──► PersistenceGateway::save (backup, atomic replace)
//!         ──► SaveReport { restart_required, .. }
//! ```
//!
//! Restarting the schematic editor is left to the caller; the session only
//! reports whether it is needed.

use std::path::{Path, PathBuf};

use fieldorder_core::transfer::EXPORT_FILE_NAME;
use fieldorder_core::{
    import_names, ConfigDocument, EntryList, FlagSet, OrderError, OrderStore, TransferError,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::storage::fs::{FileStore, LocalFileStore};
use crate::infrastructure::storage::gateway::{PersistenceGateway, StorageError};
use crate::infrastructure::transfer_file::{self, TransferFileError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    TransferFile(#[from] TransferFileError),

    /// `entry` is neither a field name nor a number.
    #[error("no field named {entry:?}")]
    UnknownEntry { entry: String },
}

/// What [`EditSession::save`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// `false` when there were no unsaved changes and nothing was written.
    pub saved: bool,
    /// The schematic editor must be restarted to see the new order.
    pub restart_required: bool,
    pub backup_path: Option<PathBuf>,
}

/// An open host configuration file and its in-memory field order.
#[derive(Debug)]
pub struct EditSession<S = LocalFileStore> {
    gateway: PersistenceGateway<S>,
    path: PathBuf,
    document: ConfigDocument,
    order: OrderStore,
}

impl<S: FileStore> EditSession<S> {
    /// Loads `path` through `gateway`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] for anything [`PersistenceGateway::load`]
    /// rejects.
    pub fn open(gateway: PersistenceGateway<S>, path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let (document, entries) = gateway.load(&path)?;
        Ok(Self {
            gateway,
            path,
            document,
            order: OrderStore::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &S {
        self.gateway.store()
    }

    pub fn order(&self) -> &OrderStore {
        &self.order
    }

    pub fn order_mut(&mut self) -> &mut OrderStore {
        &mut self.order
    }

    pub fn entries(&self) -> &EntryList {
        self.order.current_order()
    }

    /// Turns a command-line entry reference into an index.
    ///
    /// An exact field name wins; otherwise the text is read as a zero-based
    /// index.  The index is not range-checked here, so an out-of-range number
    /// surfaces as [`OrderError::IndexOutOfRange`] from the operation using it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownEntry`] if `entry` is neither.
    pub fn resolve(&self, entry: &str) -> Result<usize, SessionError> {
        if let Some(index) = self.order.position(entry) {
            return Ok(index);
        }
        entry
            .trim()
            .parse::<usize>()
            .map_err(|_| SessionError::UnknownEntry {
                entry: entry.to_string(),
            })
    }

    /// Sets the flags given and keeps the others as they are.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::IndexOutOfRange`] (as [`SessionError::Order`])
    /// if `index` is past the end; nothing changes in that case.
    pub fn update_flags(
        &mut self,
        index: usize,
        visible: Option<bool>,
        url: Option<bool>,
    ) -> Result<FlagSet, SessionError> {
        let current = self
            .entries()
            .get(index)
            .map(|entry| entry.flags)
            .unwrap_or_default();
        let flags = FlagSet::new(
            visible.unwrap_or(current.visible),
            url.unwrap_or(current.has_url),
        );
        self.order.set_flags(index, flags)?;
        Ok(flags)
    }

    /// Replaces the order with the names listed in the exchange file at
    /// `path`, keeping the flags of fields that already exist.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TransferFile`] if the file cannot be read or
    /// parsed and [`SessionError::Transfer`] if it repeats a name.  The order
    /// is unchanged on error.
    pub fn import_from(&mut self, path: &Path) -> Result<(), SessionError> {
        let names = transfer_file::read_import(self.gateway.store(), path)?;
        let merged = import_names(&names, self.order.current_order())?;
        self.order.replace(merged);
        debug!(dirty = self.order.is_dirty(), "applied imported order");
        Ok(())
    }

    /// Writes the current names to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TransferFile`] on write failure.
    pub fn export_to(&self, path: &Path) -> Result<(), SessionError> {
        transfer_file::write_export(self.gateway.store(), path, self.order.current_order())?;
        Ok(())
    }

    /// `default_fields_order.json` next to the host configuration file.
    pub fn default_export_path(&self) -> PathBuf {
        self.path.with_file_name(EXPORT_FILE_NAME)
    }

    /// Persists the current order if it differs from the last load or save.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`]; the file on disk and the unsaved
    /// state of the session are both unchanged on error.
    pub fn save(&mut self) -> Result<SaveReport, SessionError> {
        if !self.order.is_dirty() {
            info!(path = %self.path.display(), "no changes to save");
            return Ok(SaveReport {
                saved: false,
                restart_required: false,
                backup_path: None,
            });
        }

        let outcome = self
            .gateway
            .save(&self.path, &self.document, self.order.current_order())?;
        self.document = outcome.document;
        self.order.mark_saved();

        Ok(SaveReport {
            saved: true,
            restart_required: outcome.restart_required,
            backup_path: Some(outcome.backup_path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::gateway::backup_path;
    use crate::infrastructure::storage::mock::MemoryFileStore;

    const CONTENT: &str = r#"{
  "drawing": {
    "field_names": "(templatefields (field (name \"MPN\") visible) (field (name \"MANUFACTURER\")) (field (name \"DATASHEET\") url))"
  }
}
"#;

    fn host() -> PathBuf {
        PathBuf::from("/kicad/9.0/eeschema.json")
    }

    fn open(store: MemoryFileStore) -> EditSession<MemoryFileStore> {
        EditSession::open(PersistenceGateway::new(store), host()).expect("open")
    }

    fn names(session: &EditSession<MemoryFileStore>) -> Vec<String> {
        session.entries().names().map(str::to_owned).collect()
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = EditSession::open(PersistenceGateway::new(MemoryFileStore::new()), host());
        assert!(matches!(
            result,
            Err(SessionError::Storage(StorageError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_resolve_by_name_then_index() {
        let session = open(MemoryFileStore::with_file(host(), CONTENT));

        assert_eq!(session.resolve("DATASHEET").unwrap(), 2);
        assert_eq!(session.resolve("1").unwrap(), 1);
        assert_eq!(session.resolve("99").unwrap(), 99);
        assert!(matches!(
            session.resolve("NOPE"),
            Err(SessionError::UnknownEntry { .. })
        ));
    }

    #[test]
    fn test_move_and_save_writes_backup_and_reports_restart() {
        // Arrange
        let mut session = open(MemoryFileStore::with_file(host(), CONTENT));
        let index = session.resolve("DATASHEET").unwrap();

        // Act
        session.order_mut().move_to(index, 0).unwrap();
        let report = session.save().expect("save");

        // Assert
        assert!(report.saved);
        assert!(report.restart_required);
        assert_eq!(report.backup_path, Some(backup_path(&host())));
        assert!(!session.order().is_dirty());
        assert_eq!(
            session.store().contents(&backup_path(&host())).as_deref(),
            Some(CONTENT)
        );

        let reopened = open(MemoryFileStore::with_file(
            host(),
            session.store().contents(&host()).unwrap(),
        ));
        assert_eq!(names(&reopened), vec!["DATASHEET", "MPN", "MANUFACTURER"]);
        assert_eq!(
            reopened.entries().find("DATASHEET").unwrap().flags,
            FlagSet::new(false, true)
        );
    }

    #[test]
    fn test_save_without_changes_writes_nothing() {
        let mut session = open(MemoryFileStore::with_file(host(), CONTENT));

        let report = session.save().unwrap();

        assert_eq!(
            report,
            SaveReport {
                saved: false,
                restart_required: false,
                backup_path: None
            }
        );
        assert_eq!(session.store().paths(), vec![host()]);
    }

    #[test]
    fn test_move_there_and_back_is_not_dirty() {
        let mut session = open(MemoryFileStore::with_file(host(), CONTENT));

        session.order_mut().move_down(0).unwrap();
        session.order_mut().move_up(1).unwrap();

        assert!(!session.save().unwrap().saved);
    }

    #[test]
    fn test_failed_save_keeps_session_dirty() {
        // Arrange
        let store = MemoryFileStore::with_file(host(), CONTENT);
        store.fail_write_to(backup_path(&host()));
        let mut session = open(store);
        session.order_mut().move_up(2).unwrap();

        // Act
        let result = session.save();

        // Assert
        assert!(matches!(
            result,
            Err(SessionError::Storage(StorageError::BackupWrite { .. }))
        ));
        assert!(session.order().is_dirty());
        assert_eq!(session.store().contents(&host()).as_deref(), Some(CONTENT));
    }

    #[test]
    fn test_import_merges_flags_and_marks_dirty() {
        // Arrange
        let store = MemoryFileStore::with_file(host(), CONTENT);
        store.insert("/in.json", r#"{ "fields": ["DATASHEET", "NEW", "MPN"] }"#);
        let mut session = open(store);

        // Act
        session.import_from(Path::new("/in.json")).expect("import");

        // Assert
        assert!(session.order().is_dirty());
        assert_eq!(names(&session), vec!["DATASHEET", "NEW", "MPN"]);
        assert_eq!(
            session.entries().find("NEW").unwrap().flags,
            FlagSet::for_new_entry()
        );
        assert_eq!(
            session.entries().find("MPN").unwrap().flags,
            FlagSet::new(true, false)
        );
    }

    #[test]
    fn test_import_with_duplicates_leaves_order_unchanged() {
        let store = MemoryFileStore::with_file(host(), CONTENT);
        store.insert("/in.json", r#"{ "fields": ["MPN", "MPN"] }"#);
        let mut session = open(store);

        let result = session.import_from(Path::new("/in.json"));

        assert!(matches!(
            result,
            Err(SessionError::Transfer(TransferError::DuplicateName { .. }))
        ));
        assert!(!session.order().is_dirty());
    }

    #[test]
    fn test_export_to_default_path() {
        let session = open(MemoryFileStore::with_file(host(), CONTENT));
        let path = session.default_export_path();

        session.export_to(&path).expect("export");

        assert_eq!(path, PathBuf::from("/kicad/9.0/default_fields_order.json"));
        let written: serde_json::Value =
            serde_json::from_str(&session.store().contents(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            serde_json::json!({ "fields": ["MPN", "MANUFACTURER", "DATASHEET"] })
        );
    }

    #[test]
    fn test_out_of_range_index_is_reported() {
        let mut session = open(MemoryFileStore::with_file(host(), CONTENT));
        let index = session.resolve("7").unwrap();

        let result = session.order_mut().move_down(index);

        assert_eq!(result, Err(OrderError::IndexOutOfRange { index: 7, len: 3 }));
    }

    #[test]
    fn test_update_visible_only_keeps_url_flag() {
        // Arrange
        let mut session = open(MemoryFileStore::with_file(host(), CONTENT));
        let index = session.resolve("DATASHEET").unwrap();

        // Act
        let flags = session.update_flags(index, Some(true), None).unwrap();

        // Assert
        assert_eq!(flags, FlagSet::new(true, true));
        assert_eq!(session.entries().get(index).unwrap().flags, flags);
        assert!(session.order().is_dirty());
    }

    #[test]
    fn test_update_url_only_keeps_visible_flag() {
        let mut session = open(MemoryFileStore::with_file(host(), CONTENT));

        let flags = session.update_flags(0, None, Some(true)).unwrap();

        assert_eq!(flags, FlagSet::new(true, true));
    }

    #[test]
    fn test_update_with_no_flags_is_not_a_change() {
        let mut session = open(MemoryFileStore::with_file(host(), CONTENT));

        let flags = session.update_flags(1, None, None).unwrap();

        assert_eq!(flags, FlagSet::NONE);
        assert!(!session.order().is_dirty());
    }

    #[test]
    fn test_update_flags_out_of_range_changes_nothing() {
        let mut session = open(MemoryFileStore::with_file(host(), CONTENT));

        let result = session.update_flags(3, Some(true), Some(true));

        assert!(matches!(
            result,
            Err(SessionError::Order(OrderError::IndexOutOfRange { index: 3, len: 3 }))
        ));
        assert!(!session.order().is_dirty());
    }
}
