//! Backup naming and metadata.
//!
//! A backup's kind and creation second are encoded in its file name
//! (`{kind}_{YYYYMMDD_HHMMSS}.json`). The name is parsed once into a
//! [`BackupName`] instead of being picked apart wherever it's needed.

use crate::constants::{BACKUP_TIMESTAMP_FORMAT, JSON_EXTENSION};
use chrono::{DateTime, Local, NaiveDateTime};
use std::fmt;

/// Why a snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackupKind {
    /// Taken before a store write
    Auto,
    /// Requested explicitly by the user
    Manual,
    /// Taken right before a restore replaces the store
    RestoreSafety,
}

impl BackupKind {
    /// All kinds, longest prefix first so prefix matching is unambiguous.
    pub const ALL: [BackupKind; 3] = [BackupKind::RestoreSafety, BackupKind::Manual, BackupKind::Auto];

    /// File name prefix (without the trailing underscore).
    pub fn prefix(self) -> &'static str {
        match self {
            BackupKind::Auto => "auto",
            BackupKind::Manual => "manual",
            BackupKind::RestoreSafety => "restore_safety",
        }
    }
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A parsed backup file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupName {
    pub kind: BackupKind,
    pub stamp: NaiveDateTime,
}

impl BackupName {
    /// Names a snapshot of `kind` taken at `at`.
    pub fn new(kind: BackupKind, at: DateTime<Local>) -> Self {
        Self {
            kind,
            stamp: at.naive_local(),
        }
    }

    /// Parses `auto_20240501_080000.json` and friends.
    ///
    /// Returns `None` for names that don't follow the backup naming scheme.
    pub fn parse(filename: &str) -> Option<Self> {
        let stem = filename.strip_suffix(&format!(".{}", JSON_EXTENSION))?;
        BackupKind::ALL.iter().find_map(|&kind| {
            let rest = stem.strip_prefix(kind.prefix())?.strip_prefix('_')?;
            let stamp = NaiveDateTime::parse_from_str(rest, BACKUP_TIMESTAMP_FORMAT).ok()?;
            Some(Self { kind, stamp })
        })
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.{}",
            self.kind.prefix(),
            self.stamp.format(BACKUP_TIMESTAMP_FORMAT),
            JSON_EXTENSION
        )
    }
}

impl fmt::Display for BackupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Metadata about one backup file.
///
/// `created_at` is the file's modification time and is what ordering and
/// pruning use. `kind` is `None` for `.json` files in the backup
/// directory whose names don't follow the naming scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupRecord {
    pub filename: String,
    pub kind: Option<BackupKind>,
    pub size: u64,
    /// Number of entries, or `None` if the file doesn't parse
    pub entry_count: Option<usize>,
    pub created_at: DateTime<Local>,
}
