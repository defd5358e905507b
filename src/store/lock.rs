//! Process-level exclusive lock on a wiki directory.

use crate::constants::LOCK_FILE_NAME;
use crate::errors::{AppResult, LockError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Holds an exclusive advisory lock on `<root>/.pocketwiki.lock` until dropped.
///
/// The in-process `Mutex` around the wiki serializes requests; this lock keeps
/// a second process from operating on the same directory at the same time.
#[derive(Debug)]
pub struct DataDirLock {
    file: File,
    path: PathBuf,
}

impl DataDirLock {
    /// Acquires the lock without blocking.
    ///
    /// # Errors
    ///
    /// - `LockError::FileBusy` if another handle already holds the lock
    /// - `LockError::AcquisitionFailed` if the lock file cannot be opened or locked
    pub fn acquire(root_dir: &Path) -> AppResult<Self> {
        let path = root_dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::AcquisitionFailed {
                path: path.clone(),
                source,
            })?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                debug!(lock = %path.display(), "Acquired data directory lock");
                Ok(Self { file, path })
            }
            Err(e) if is_contended(&e) => Err(LockError::FileBusy { path }.into()),
            Err(source) => Err(LockError::AcquisitionFailed { path, source }.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn is_contended(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
