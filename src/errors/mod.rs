//! Error handling utilities for the pocketwiki application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents errors that can occur when attempting to lock the wiki directory.
///
/// Only one process may operate on a wiki directory at a time. The lock is an
/// advisory lock on a sidecar file, held for the lifetime of the process.
///
/// # Examples
///
/// ```
/// use pocketwiki::errors::LockError;
/// use std::path::PathBuf;
///
/// let error = LockError::FileBusy {
///     path: PathBuf::from("/wiki/.pocketwiki.lock"),
/// };
///
/// assert!(format!("{}", error).contains("already in use"));
/// ```
#[derive(Debug, Error)]
pub enum LockError {
    /// Error when the directory is already locked by another process.
    #[error("Wiki directory is already in use by another process (lock file: {}). Stop the other pocketwiki instance or point this one at a different directory.", path.display())]
    FileBusy {
        /// The path to the lock file
        path: PathBuf,
    },

    /// Error when acquiring the lock fails for a technical reason.
    #[error("Failed to acquire lock {}: {source}. Please check file permissions and ensure the directory is accessible.", path.display())]
    AcquisitionFailed {
        /// The path to the lock file that couldn't be locked
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents all possible errors that can occur in the pocketwiki application.
///
/// This enum is the central error type used across the application. The HTTP
/// layer maps `InvalidPayload` to 400, `NotFound` to 404 and everything else
/// to 500.
///
/// Note: This type does not implement `Clone` to avoid losing error context when
/// cloning `std::io::Error` values.
///
/// # Examples
///
/// ```
/// use pocketwiki::errors::AppError;
///
/// let error = AppError::NotFound("auto_20240101_120000.json".to_string());
/// assert_eq!(format!("{}", error), "Not found: auto_20240101_120000.json");
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The client sent malformed or wrong-shaped data.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A referenced backup (or the store itself) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A file that should contain a JSON array of entries does not parse.
    #[error("Corrupt data in {}: {source}", path.display())]
    CorruptData {
        /// The file that failed to parse
        path: PathBuf,
        /// The underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// Errors related to the data-directory lock.
    #[error("File locking error: {0}")]
    Lock(#[from] LockError),
}

impl AppError {
    /// Builds a `CorruptData` error for `path`.
    pub fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        AppError::CorruptData {
            path: path.into(),
            source,
        }
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
pub type AppResult<T> = Result<T, AppError>;
