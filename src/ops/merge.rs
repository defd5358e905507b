//! Merge a backup's entries into the current store.
//!
//! The merge only computes the combined entry list; persisting it is up to the
//! caller, who normally hands it to [`EntryStore::write`] so the usual
//! snapshot-before-write applies.

use crate::clock::Clock;
use crate::constants::IMPORTED_TITLE_SUFFIX;
use crate::errors::AppResult;
use crate::store::{Entry, EntryStore};
use std::collections::HashSet;
use tracing::{debug, info};

/// Hands out replacement ids for incoming entries whose id is taken.
pub trait IdAllocator {
    /// Returns an id not contained in `taken`.
    ///
    /// `offset` is the number of entries appended so far in this merge.
    fn allocate(&mut self, offset: usize, taken: &HashSet<i64>) -> i64;
}

/// Strictly increasing, collision-checked id sequence seeded from a base value
/// (normally the current time in epoch milliseconds).
///
/// Each allocation starts from `seed + offset`, never goes below the previous
/// allocation, and steps past any id already taken.
#[derive(Debug, Clone)]
pub struct IdSequence {
    seed: i64,
    next: i64,
}

impl IdSequence {
    pub fn starting_at(seed: i64) -> Self {
        Self { seed, next: seed }
    }

    /// Seeds the sequence with the clock's current epoch milliseconds.
    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::starting_at(clock.now().timestamp_millis())
    }
}

impl IdAllocator for IdSequence {
    fn allocate(&mut self, offset: usize, taken: &HashSet<i64>) -> i64 {
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let mut candidate = self.seed.saturating_add(offset).max(self.next);
        while taken.contains(&candidate) {
            candidate += 1;
        }
        self.next = candidate + 1;
        candidate
    }
}

/// Result of merging a backup into the current entries.
#[derive(Debug, Clone)]
pub struct MergeReport {
    /// Current entries followed by every imported entry
    pub merged: Vec<Entry>,
    /// Number of entries appended from the backup
    pub added_count: usize,
    /// Imported entries that received a new id
    pub reassigned: usize,
    /// Imported entries whose title got the imported suffix
    pub renamed: usize,
}

/// Merges backup `filename` into the store's current entries.
///
/// # Errors
///
/// - `AppError::NotFound` if the backup doesn't exist
/// - `AppError::CorruptData` if the backup or the current store doesn't parse
pub fn merge_backup(
    store: &EntryStore,
    filename: &str,
    ids: &mut dyn IdAllocator,
) -> AppResult<MergeReport> {
    let incoming = store.backups().load_entries(filename)?;
    let current = store.load()?;
    let report = merge_entries(current, incoming, ids);
    info!(
        %filename,
        added = report.added_count,
        reassigned = report.reassigned,
        renamed = report.renamed,
        "Merged backup"
    );
    Ok(report)
}

/// Appends `incoming` to `current`, resolving collisions.
///
/// Current entries are never modified. An incoming entry whose id is already
/// present anywhere in the merged result gets a fresh id from `ids`. An
/// incoming entry whose title matches a title from the original `current` list
/// gets [`IMPORTED_TITLE_SUFFIX`] appended. The two checks are independent.
pub fn merge_entries(
    current: Vec<Entry>,
    incoming: Vec<Entry>,
    ids: &mut dyn IdAllocator,
) -> MergeReport {
    let original_titles: HashSet<String> = current.iter().map(|e| e.title.clone()).collect();
    let mut taken: HashSet<i64> = current.iter().map(|e| e.id).collect();
    let mut merged = current;
    merged.reserve(incoming.len());

    let mut added_count = 0;
    let mut reassigned = 0;
    let mut renamed = 0;

    for mut entry in incoming {
        if taken.contains(&entry.id) {
            let fresh = ids.allocate(added_count, &taken);
            debug!(old = entry.id, new = fresh, "Reassigned colliding id");
            entry.id = fresh;
            reassigned += 1;
        }
        taken.insert(entry.id);

        if original_titles.contains(&entry.title) {
            entry.title.push_str(IMPORTED_TITLE_SUFFIX);
            renamed += 1;
        }

        merged.push(entry);
        added_count += 1;
    }

    MergeReport {
        merged,
        added_count,
        reassigned,
        renamed,
    }
}
