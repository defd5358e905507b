//! The entry store: one JSON document holding every wiki entry.
//!
//! The store file is the single mutable artifact of a wiki. Every write
//! replaces it wholesale, and every write over a non-empty prior store is
//! preceded by an `auto_` snapshot taken through the [`BackupManager`].
//!
//! # Module Structure
//!
//! - `entry`: the `Entry` model
//! - `lock`: the process-level data directory lock

pub mod entry;
pub mod lock;

pub use entry::Entry;
pub use lock::DataDirLock;

use crate::backup::{BackupKind, BackupManager, BackupRecord};
use crate::errors::{AppError, AppResult};
use serde::de::IgnoredAny;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What a successful [`EntryStore::write`] did.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// Number of entries now in the store
    pub entries: usize,
    /// The snapshot taken before overwriting, if there was a prior store
    pub backup: Option<BackupRecord>,
    /// Names of backups removed by retention pruning
    pub pruned: Vec<String>,
    /// True when a non-empty store was replaced by an empty one
    pub emptied_existing: bool,
}

/// The state of the store file just before a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PriorState {
    Missing,
    Entries(usize),
    Unreadable,
}

impl PriorState {
    fn needs_snapshot(self) -> bool {
        match self {
            PriorState::Missing => false,
            PriorState::Entries(count) => count > 0,
            PriorState::Unreadable => true,
        }
    }
}

/// Read/write access to the store file.
pub struct EntryStore {
    data_file: PathBuf,
    backups: BackupManager,
    atomic_writes: bool,
}

impl EntryStore {
    /// Creates a store over `data_file`, snapshotting through `backups`.
    ///
    /// With `atomic_writes` the new document is written to a temporary file
    /// in the same directory and renamed into place; otherwise the file is
    /// overwritten in place.
    pub fn new(data_file: impl Into<PathBuf>, backups: BackupManager, atomic_writes: bool) -> Self {
        Self {
            data_file: data_file.into(),
            backups,
            atomic_writes,
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    pub fn exists(&self) -> bool {
        self.data_file.is_file()
    }

    /// Returns the raw bytes of the store, or `None` if it doesn't exist yet.
    pub fn read_raw(&self) -> AppResult<Option<Vec<u8>>> {
        match fs::read(&self.data_file) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(io::Error::new(
                e.kind(),
                format!("Failed to read {}: {}", self.data_file.display(), e),
            ))),
        }
    }

    /// Loads every entry in stored order.
    ///
    /// # Errors
    ///
    /// - `AppError::CorruptData` if the file exists but is not a JSON array of entries
    /// - `AppError::Io` if the file cannot be read
    pub fn load(&self) -> AppResult<Vec<Entry>> {
        match self.read_raw()? {
            None => Ok(Vec::new()),
            Some(bytes) => {
                Entry::parse_list(&bytes).map_err(|e| AppError::corrupt(&self.data_file, e))
            }
        }
    }

    /// Replaces the store with `entries`.
    ///
    /// If the current store holds at least one entry (or cannot be parsed), an
    /// `auto_` snapshot is taken first and retention pruning runs. A failed
    /// snapshot aborts the write. Replacing a non-empty store with an empty one
    /// is allowed but logged as suspicious.
    pub fn write(&self, entries: &[Entry]) -> AppResult<WriteOutcome> {
        let prior = self.prior_state()?;
        debug!(?prior, incoming = entries.len(), "Writing store");

        let emptied_existing = matches!(prior, PriorState::Entries(n) if n > 0) && entries.is_empty();
        if emptied_existing {
            warn!(
                data_file = %self.data_file.display(),
                "Overwriting existing entries with an empty store"
            );
        }

        let mut backup = None;
        let mut pruned = Vec::new();
        if prior.needs_snapshot() {
            backup = self.backups.snapshot(BackupKind::Auto)?;
            match self.backups.prune() {
                Ok(report) => {
                    if !report.failed.is_empty() {
                        warn!(failed = ?report.failed, "Some old backups could not be pruned");
                    }
                    pruned = report.removed;
                }
                Err(e) => warn!(error = %e, "Backup pruning failed"),
            }
        }

        let document = Entry::to_document(entries).map_err(|e| {
            AppError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to serialize entries: {}", e),
            ))
        })?;
        self.replace_raw(&document)?;
        info!(entries = entries.len(), "Saved store");

        Ok(WriteOutcome {
            entries: entries.len(),
            backup,
            pruned,
            emptied_existing,
        })
    }

    /// Overwrites the store with `bytes` exactly as given. No snapshot is taken.
    pub fn replace_raw(&self, bytes: &[u8]) -> AppResult<()> {
        if let Some(parent) = self.data_file.parent() {
            fs::create_dir_all(parent)?;
        }

        if self.atomic_writes {
            self.replace_atomically(bytes)
        } else {
            fs::write(&self.data_file, bytes).map_err(|e| {
                AppError::Io(io::Error::new(
                    e.kind(),
                    format!("Failed to write {}: {}", self.data_file.display(), e),
                ))
            })
        }
    }

    fn replace_atomically(&self, bytes: &[u8]) -> AppResult<()> {
        let dir = self
            .data_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.data_file).map_err(|e| {
            AppError::Io(io::Error::new(
                e.error.kind(),
                format!("Failed to move new store into place: {}", e.error),
            ))
        })?;
        Ok(())
    }

    fn prior_state(&self) -> AppResult<PriorState> {
        let Some(bytes) = self.read_raw()? else {
            return Ok(PriorState::Missing);
        };
        Ok(match serde_json::from_slice::<Vec<IgnoredAny>>(&bytes) {
            Ok(items) => PriorState::Entries(items.len()),
            Err(e) => {
                warn!(error = %e, "Existing store does not parse; snapshotting it anyway");
                PriorState::Unreadable
            }
        })
    }
}
