//! Constants used throughout the application.
//!
//! This module contains all constants used in the PocketWiki application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "pocketwiki";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A portable personal wiki with timestamped JSON backups";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Log level used when `--verbose` is given.
pub const VERBOSE_LOG_LEVEL: &str = "debug";

// Configuration Keys & Environment Variables
/// Environment variable for the wiki root directory.
pub const ENV_VAR_WIKI_DIR: &str = "POCKETWIKI_DIR";
/// Environment variable for the HTTP bind host.
pub const ENV_VAR_WIKI_HOST: &str = "POCKETWIKI_HOST";
/// Environment variable for the HTTP port.
pub const ENV_VAR_WIKI_PORT: &str = "POCKETWIKI_PORT";
/// Environment variable for the backup retention limit.
pub const ENV_VAR_WIKI_MAX_BACKUPS: &str = "POCKETWIKI_MAX_BACKUPS";
/// Environment variable enabling temp-file-and-rename store writes.
pub const ENV_VAR_WIKI_ATOMIC_WRITES: &str = "POCKETWIKI_ATOMIC_WRITES";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default sub-directory name for the wiki within the user's home directory.
pub const DEFAULT_WIKI_SUBDIR: &str = "PocketWiki";
/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

// File System Layout
/// Directory (under the root) holding the store file.
pub const DATA_SUBDIR: &str = "data";
/// Name of the store file.
pub const DATA_FILE_NAME: &str = "wiki_data.json";
/// Directory (under the root) holding backup snapshots.
pub const BACKUP_SUBDIR: &str = "backups";
/// Advisory lock file held for the lifetime of a process.
pub const LOCK_FILE_NAME: &str = ".pocketwiki.lock";
/// Extension shared by the store and every backup.
pub const JSON_EXTENSION: &str = "json";

// Backups
/// Maximum number of backups kept after pruning.
pub const DEFAULT_MAX_BACKUPS: usize = 30;
/// Timestamp embedded in backup file names (sortable, second precision).
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
/// Human-readable local timestamp used in backup listings.
pub const BACKUP_LOCAL_DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
/// Placeholder reported when a backup's entry count cannot be determined.
pub const UNKNOWN_COUNT_MARKER: &str = "?";

// Merge
/// Suffix appended to imported entries whose title already exists.
pub const IMPORTED_TITLE_SUFFIX: &str = " (imported)";

// HTTP
/// Maximum accepted request body (entries may embed images).
pub const MAX_REQUEST_BODY_BYTES: usize = 50 * 1024 * 1024;

// Logging Configuration
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
