//! Timestamped snapshots of the entry store.
//!
//! Backups are byte-for-byte copies of the store file, kept in a sibling
//! directory. They are never modified after creation; they are only created,
//! listed, pruned by retention, and deleted on request.

pub mod record;

pub use record::{BackupKind, BackupName, BackupRecord};

use crate::clock::Clock;
use crate::constants::JSON_EXTENSION;
use crate::errors::{AppError, AppResult};
use crate::store::Entry;
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a retention pass.
#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    /// Backups that were deleted, oldest first
    pub removed: Vec<String>,
    /// Backups that should have been deleted but couldn't be
    pub failed: Vec<String>,
}

/// Creates, lists, prunes and deletes backups of one store file.
pub struct BackupManager {
    backup_dir: PathBuf,
    data_file: PathBuf,
    max_backups: usize,
    clock: Arc<dyn Clock>,
}

impl BackupManager {
    pub fn new(
        backup_dir: impl Into<PathBuf>,
        data_file: impl Into<PathBuf>,
        max_backups: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            data_file: data_file.into(),
            max_backups,
            clock,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Copies the current store file into the backup directory.
    ///
    /// Returns `Ok(None)` without touching anything if there is no store file.
    /// Two snapshots of the same kind within one second share a name; the
    /// later one replaces the earlier.
    pub fn snapshot(&self, kind: BackupKind) -> AppResult<Option<BackupRecord>> {
        if !self.data_file.is_file() {
            debug!(%kind, "No store file, skipping snapshot");
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            AppError::Io(io::Error::new(
                e.kind(),
                format!("Failed to create backup directory: {}", e),
            ))
        })?;

        let name = BackupName::new(kind, self.clock.now());
        let target = self.backup_dir.join(name.file_name());
        if target.exists() {
            warn!(filename = %name, "Replacing backup taken within the same second");
        }

        fs::copy(&self.data_file, &target).map_err(|e| {
            AppError::Io(io::Error::new(
                e.kind(),
                format!("Failed to copy store to {}: {}", target.display(), e),
            ))
        })?;
        info!(filename = %name, "Created backup");

        self.describe(&target).map(Some)
    }

    /// Lists every `.json` file in the backup directory, newest first.
    ///
    /// A file that can't be read or parsed doesn't fail the listing; unreadable
    /// files are skipped and unparsable ones are reported with an unknown count.
    pub fn list(&self) -> AppResult<Vec<BackupRecord>> {
        let mut records = Vec::new();
        for path in self.backup_files()? {
            match self.describe(&path) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable backup"),
            }
        }

        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.filename.cmp(&a.filename))
        });
        Ok(records)
    }

    /// Deletes the oldest backups until at most `max_backups` remain.
    ///
    /// Age is the file modification time. A file that fails to delete is
    /// logged and recorded in the report; the remaining deletions still run.
    pub fn prune(&self) -> AppResult<PruneReport> {
        let mut dated: Vec<(DateTime<Local>, String, PathBuf)> = Vec::new();
        for path in self.backup_files()? {
            match modified_at(&path) {
                Ok(mtime) => dated.push((mtime, file_name_of(&path), path)),
                Err(e) => warn!(path = %path.display(), error = %e, "Cannot stat backup"),
            }
        }

        let mut report = PruneReport::default();
        if dated.len() <= self.max_backups {
            return Ok(report);
        }

        // Newest first, then everything past the limit goes, oldest first.
        dated.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        for (_, filename, path) in dated.into_iter().skip(self.max_backups).rev() {
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!(%filename, "Pruned old backup");
                    report.removed.push(filename);
                }
                Err(e) => {
                    warn!(%filename, error = %e, "Failed to prune backup");
                    report.failed.push(filename);
                }
            }
        }
        Ok(report)
    }

    /// Deletes one backup. Does not trigger pruning.
    pub fn delete(&self, filename: &str) -> AppResult<()> {
        let path = self.resolve(filename)?;
        fs::remove_file(&path)?;
        info!(%filename, "Deleted backup");
        Ok(())
    }

    /// Maps a user-supplied backup name to its path.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidPayload` if the name could escape the backup directory
    /// - `AppError::NotFound` if no such backup exists
    pub fn resolve(&self, filename: &str) -> AppResult<PathBuf> {
        validate_filename(filename)?;
        let path = self.backup_dir.join(filename);
        if !path.is_file() {
            return Err(AppError::NotFound(filename.to_string()));
        }
        Ok(path)
    }

    /// Reads a backup's raw bytes.
    pub fn read_raw(&self, filename: &str) -> AppResult<(PathBuf, Vec<u8>)> {
        let path = self.resolve(filename)?;
        let bytes = fs::read(&path)?;
        Ok((path, bytes))
    }

    /// Reads and parses a backup's entries.
    pub fn load_entries(&self, filename: &str) -> AppResult<Vec<Entry>> {
        let (path, bytes) = self.read_raw(filename)?;
        Entry::parse_list(&bytes).map_err(|e| AppError::corrupt(path, e))
    }

    fn describe(&self, path: &Path) -> AppResult<BackupRecord> {
        let metadata = fs::metadata(path)?;
        let filename = file_name_of(path);
        let name = BackupName::parse(&filename);
        let entry_count = fs::read(path).ok().and_then(|bytes| count_entries(&bytes));

        Ok(BackupRecord {
            kind: name.map(|n| n.kind),
            filename,
            size: metadata.len(),
            entry_count,
            created_at: DateTime::<Local>::from(metadata.modified()?),
        })
    }

    fn backup_files(&self) -> AppResult<Vec<PathBuf>> {
        let read_dir = match fs::read_dir(&self.backup_dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Io(io::Error::new(
                    e.kind(),
                    format!("Failed to read backup directory: {}", e),
                )))
            }
        };

        Ok(read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == JSON_EXTENSION)
            })
            .collect())
    }
}

/// Counts entries in a backup document, or `None` if restore and merge would
/// reject it.
fn count_entries(bytes: &[u8]) -> Option<usize> {
    Entry::parse_list(bytes).ok().map(|entries| entries.len())
}

fn modified_at(path: &Path) -> io::Result<DateTime<Local>> {
    Ok(DateTime::<Local>::from(fs::metadata(path)?.modified()?))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn validate_filename(filename: &str) -> AppResult<()> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
        || filename.contains('\0')
    {
        return Err(AppError::InvalidPayload(format!(
            "Invalid backup name: {:?}",
            filename
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{Duration, TimeZone};
    use std::fs::File;
    use std::time::{Duration as StdDuration, SystemTime};
    use tempfile::{tempdir, TempDir};

    fn manager(dir: &TempDir, max: usize) -> BackupManager {
        let clock = Arc::new(FixedClock::stepping(
            Local.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            Duration::seconds(1),
        ));
        BackupManager::new(
            dir.path().join("backups"),
            dir.path().join("wiki_data.json"),
            max,
            clock,
        )
    }

    fn write_backup(dir: &TempDir, name: &str, body: &str, age_secs: u64) {
        let backups = dir.path().join("backups");
        fs::create_dir_all(&backups).unwrap();
        let path = backups.join(name);
        fs::write(&path, body).unwrap();
        let mtime = SystemTime::now() - StdDuration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    #[test]
    fn test_snapshot_without_store_is_noop() {
        let dir = tempdir().unwrap();
        let manager = manager(&dir, 30);
        assert!(manager.snapshot(BackupKind::Manual).unwrap().is_none());
        assert!(!dir.path().join("backups").exists());
    }

    #[test]
    fn test_snapshot_copies_bytes_and_names_by_kind() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("wiki_data.json"), "[{\"id\":1}]").unwrap();
        let manager = manager(&dir, 30);

        let record = manager.snapshot(BackupKind::Manual).unwrap().unwrap();
        assert_eq!(record.filename, "manual_20240601_120000.json");
        assert_eq!(record.kind, Some(BackupKind::Manual));
        assert_eq!(record.entry_count, Some(1));
        assert_eq!(
            fs::read_to_string(manager.backup_dir().join(&record.filename)).unwrap(),
            "[{\"id\":1}]"
        );
    }

    #[test]
    fn test_list_is_newest_first_and_tolerates_corruption() {
        let dir = tempdir().unwrap();
        write_backup(
            &dir,
            "auto_20240101_000000.json",
            r#"[{"id":1},{"id":2,"title":"B"},{"id":3}]"#,
            300,
        );
        write_backup(&dir, "auto_20240102_000000.json", "{broken", 200);
        write_backup(&dir, "manual_20240103_000000.json", "[]", 100);
        write_backup(&dir, "readme.txt", "ignored", 50);

        let records = manager(&dir, 30).list().unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "manual_20240103_000000.json",
                "auto_20240102_000000.json",
                "auto_20240101_000000.json"
            ]
        );
        assert_eq!(records[0].entry_count, Some(0));
        assert_eq!(records[1].entry_count, None);
        assert_eq!(records[2].entry_count, Some(3));
    }

    #[test]
    fn test_count_is_unknown_for_documents_restore_rejects() {
        let dir = tempdir().unwrap();
        write_backup(&dir, "auto_20240101_000000.json", r#"[{"title":"x"}]"#, 300);
        write_backup(&dir, "auto_20240102_000000.json", r#"{"id":1}"#, 200);
        write_backup(&dir, "auto_20240103_000000.json", "[1,2,3]", 100);

        let backups = manager(&dir, 30);
        for record in backups.list().unwrap() {
            assert_eq!(record.entry_count, None, "{}", record.filename);
            assert!(backups.load_entries(&record.filename).is_err());
        }
    }

    #[test]
    fn test_list_without_directory_is_empty() {
        let dir = tempdir().unwrap();
        assert!(manager(&dir, 30).list().unwrap().is_empty());
    }

    #[test]
    fn test_prune_removes_oldest_by_mtime() {
        let dir = tempdir().unwrap();
        // Names deliberately disagree with mtimes: mtime wins.
        write_backup(&dir, "auto_20240105_000000.json", "[]", 500);
        write_backup(&dir, "auto_20240104_000000.json", "[]", 400);
        write_backup(&dir, "auto_20240103_000000.json", "[]", 300);
        write_backup(&dir, "auto_20240102_000000.json", "[]", 200);
        write_backup(&dir, "auto_20240101_000000.json", "[]", 100);

        let report = manager(&dir, 3).prune().unwrap();
        assert_eq!(
            report.removed,
            vec!["auto_20240105_000000.json", "auto_20240104_000000.json"]
        );
        assert!(report.failed.is_empty());

        let left: Vec<String> = manager(&dir, 3)
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.filename)
            .collect();
        assert_eq!(
            left,
            vec![
                "auto_20240101_000000.json",
                "auto_20240102_000000.json",
                "auto_20240103_000000.json"
            ]
        );
    }

    #[test]
    fn test_prune_under_limit_keeps_everything() {
        let dir = tempdir().unwrap();
        write_backup(&dir, "auto_20240101_000000.json", "[]", 10);
        let report = manager(&dir, 30).prune().unwrap();
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_delete_missing_backup_is_not_found() {
        let dir = tempdir().unwrap();
        write_backup(&dir, "auto_20240101_000000.json", "[]", 10);
        let manager = manager(&dir, 30);

        assert!(matches!(
            manager.delete("auto_19990101_000000.json"),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(manager.list().unwrap().len(), 1);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = tempdir().unwrap();
        let manager = manager(&dir, 30);
        for name in ["../wiki_data.json", "a/b.json", "..", "", "x\0.json"] {
            assert!(
                matches!(manager.resolve(name), Err(AppError::InvalidPayload(_))),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_load_entries_reports_corruption() {
        let dir = tempdir().unwrap();
        write_backup(&dir, "auto_20240101_000000.json", "nope", 10);
        assert!(matches!(
            manager(&dir, 30).load_entries("auto_20240101_000000.json"),
            Err(AppError::CorruptData { .. })
        ));
    }
}
