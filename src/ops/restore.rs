//! Restore the store from a backup.

use crate::backup::{BackupKind, BackupRecord};
use crate::errors::{AppError, AppResult};
use crate::store::{Entry, EntryStore};
use tracing::info;

/// Report of a completed restore.
#[derive(Debug, Clone)]
pub struct RestoreReport {
    /// The backup that was restored
    pub source: String,
    /// Entries now in the store
    pub entries: Vec<Entry>,
    /// Snapshot of the store taken before it was replaced
    pub safety_backup: Option<BackupRecord>,
}

/// Replaces the store with the contents of backup `filename`.
///
/// # Flow
///
/// 1. Read and parse the backup; nothing is touched if it is missing or corrupt
/// 2. Snapshot the current store as `restore_safety_*` (if there is one)
/// 3. Overwrite the store with the backup's exact bytes
///
/// Pruning does not run, so the safety snapshot always survives the restore
/// itself. If step 3 fails the safety snapshot remains on disk.
///
/// # Errors
///
/// - `AppError::NotFound` if the backup doesn't exist
/// - `AppError::CorruptData` if the backup is not a JSON array of entries
/// - `AppError::Io` if the snapshot or the store write fails
pub fn restore_backup(store: &EntryStore, filename: &str) -> AppResult<RestoreReport> {
    let backups = store.backups();
    let (path, raw) = backups.read_raw(filename)?;
    let entries = Entry::parse_list(&raw).map_err(|e| AppError::corrupt(path, e))?;

    let safety_backup = backups.snapshot(BackupKind::RestoreSafety)?;
    store.replace_raw(&raw)?;
    info!(
        %filename,
        entries = entries.len(),
        safety = safety_backup.as_ref().map(|r| r.filename.as_str()),
        "Restored store from backup"
    );

    Ok(RestoreReport {
        source: filename.to_string(),
        entries,
        safety_backup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupManager;
    use crate::clock::FixedClock;
    use chrono::{Duration, Local, TimeZone};
    use std::fs;
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};

    fn store_in(dir: &TempDir) -> EntryStore {
        let data_file = dir.path().join("wiki_data.json");
        let clock = Arc::new(FixedClock::stepping(
            Local.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap(),
            Duration::seconds(1),
        ));
        let backups = BackupManager::new(dir.path().join("backups"), &data_file, 30, clock);
        EntryStore::new(data_file, backups, false)
    }

    #[test]
    fn test_restore_writes_raw_bytes_and_keeps_safety_copy() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let backup_body = "[{\"id\":1,\"title\":\"Old\"}]";
        fs::create_dir_all(dir.path().join("backups")).unwrap();
        fs::write(
            dir.path().join("backups").join("manual_20240101_000000.json"),
            backup_body,
        )
        .unwrap();
        store.write(&[Entry::new(2, "Current")]).unwrap();
        let current = fs::read(store.data_file()).unwrap();

        let report = restore_backup(&store, "manual_20240101_000000.json").unwrap();
        assert_eq!(report.entries, vec![Entry::new(1, "Old")]);
        assert_eq!(fs::read_to_string(store.data_file()).unwrap(), backup_body);

        let safety = report.safety_backup.expect("safety backup expected");
        assert_eq!(safety.kind, Some(BackupKind::RestoreSafety));
        assert_eq!(
            fs::read(dir.path().join("backups").join(safety.filename)).unwrap(),
            current
        );
    }

    #[test]
    fn test_corrupt_backup_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.write(&[Entry::new(2, "Current")]).unwrap();
        fs::create_dir_all(dir.path().join("backups")).unwrap();
        fs::write(dir.path().join("backups").join("auto_20240101_000000.json"), "[{").unwrap();
        let before = fs::read(store.data_file()).unwrap();

        let result = restore_backup(&store, "auto_20240101_000000.json");
        assert!(matches!(result, Err(AppError::CorruptData { .. })));
        assert_eq!(fs::read(store.data_file()).unwrap(), before);
        assert_eq!(store.backups().list().unwrap().len(), 1);
    }

    #[test]
    fn test_restore_without_current_store_skips_safety_copy() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(dir.path().join("backups")).unwrap();
        fs::write(dir.path().join("backups").join("auto_20240101_000000.json"), "[]").unwrap();

        let report = restore_backup(&store, "auto_20240101_000000.json").unwrap();
        assert!(report.safety_backup.is_none());
        assert!(store.exists());
    }
}
