//! The `Wiki` facade: one store plus its backups, built from a [`Config`].
//!
//! Every mutating operation of the application goes through a `Wiki`. The
//! server wraps it in a mutex so that at most one operation touches the data
//! directory at a time.

use crate::backup::{BackupKind, BackupManager, BackupRecord};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::constants::BACKUP_LOCAL_DISPLAY_FORMAT;
use crate::errors::{AppError, AppResult};
use crate::ops::{self, IdSequence, MergeReport, RestoreReport};
use crate::store::{Entry, EntryStore, WriteOutcome};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

const WELCOME_TITLE: &str = "Welcome to PocketWiki";
const WELCOME_CATEGORY: &str = "Getting started";
const WELCOME_TAGS: [&str; 2] = ["manual", "important"];
const WELCOME_CONTENT: &str = "# PocketWiki

A personal wiki that lives in a single folder.

## Saving

Every save replaces `data/wiki_data.json`. Before a save overwrites existing
entries, the previous file is copied into `backups/` as `auto_<timestamp>.json`.
Only the newest backups are kept.

## Backups

- **Manual backup** copies the current data as `manual_<timestamp>.json`.
- **Restore** replaces the data with a backup. The data it replaces is kept
  as `restore_safety_<timestamp>.json`, so a restore can itself be undone.
- **Merge** appends a backup's entries to the current ones. Entries whose id
  is already used get a new id; entries whose title already exists get
  ` (imported)` appended.

## Moving the wiki

Copy the whole folder. Everything the wiki knows is in `data/` and `backups/`.
";

/// A wiki rooted at one data directory.
pub struct Wiki {
    store: EntryStore,
    clock: Arc<dyn Clock>,
}

impl Wiki {
    /// Opens the wiki described by `config` using the system clock.
    pub fn open(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Opens the wiki with an explicit time source.
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        let data_file = config.data_file();
        let backups = BackupManager::new(
            config.backup_dir(),
            &data_file,
            config.max_backups,
            Arc::clone(&clock),
        );
        let store = EntryStore::new(data_file, backups, config.atomic_writes);
        Self { store, clock }
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn load(&self) -> AppResult<Vec<Entry>> {
        self.store.load()
    }

    /// Replaces every entry, snapshotting the previous store when it had any.
    pub fn save(&self, entries: &[Entry]) -> AppResult<WriteOutcome> {
        self.store.write(entries)
    }

    pub fn list_backups(&self) -> AppResult<Vec<BackupRecord>> {
        self.store.backups().list()
    }

    /// Takes a `manual_` snapshot of the current store and applies retention.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if there is no store to back up.
    pub fn manual_backup(&self) -> AppResult<BackupRecord> {
        let backups = self.store.backups();
        let record = backups
            .snapshot(BackupKind::Manual)?
            .ok_or_else(|| AppError::NotFound("no wiki data file exists yet".to_string()))?;

        match backups.prune() {
            Ok(report) if !report.failed.is_empty() => {
                warn!(failed = ?report.failed, "Some old backups could not be pruned");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Backup pruning failed"),
        }
        Ok(record)
    }

    pub fn restore(&self, filename: &str) -> AppResult<RestoreReport> {
        ops::restore_backup(&self.store, filename)
    }

    /// Computes the merge of backup `filename` into the current entries.
    ///
    /// Nothing is written; pass `report.merged` to [`Wiki::save`] to keep it.
    pub fn merge(&self, filename: &str) -> AppResult<MergeReport> {
        let mut ids = IdSequence::from_clock(self.clock.as_ref());
        ops::merge_backup(&self.store, filename, &mut ids)
    }

    pub fn delete_backup(&self, filename: &str) -> AppResult<()> {
        self.store.backups().delete(filename)
    }

    /// Writes a single welcome entry if the store file doesn't exist yet.
    ///
    /// Returns whether an entry was written.
    pub fn seed_if_missing(&self) -> AppResult<bool> {
        if self.store.exists() {
            return Ok(false);
        }

        let now = self.clock.now();
        let welcome = Entry::new(now.timestamp_millis(), WELCOME_TITLE)
            .with_field("category", WELCOME_CATEGORY)
            .with_field("tags", json!(WELCOME_TAGS))
            .with_field("content", WELCOME_CONTENT)
            .with_field(
                "updated",
                now.format(BACKUP_LOCAL_DISPLAY_FORMAT).to_string(),
            );
        self.store.write(&[welcome])?;
        info!(data_file = %self.store.data_file().display(), "Seeded new wiki with welcome entry");
        Ok(true)
    }
}
