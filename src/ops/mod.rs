//! High-level operations on a wiki's store and backups.
//!
//! This module provides the user-facing operations that combine the entry
//! store with its backups: restoring from a backup, merging a backup into the
//! current entries, and validating documents sent by clients.

pub mod merge;
pub mod restore;
pub mod save;

// Re-export commonly used functions
pub use merge::{merge_backup, merge_entries, IdAllocator, IdSequence, MergeReport};
pub use restore::{restore_backup, RestoreReport};
pub use save::parse_entries_payload;
