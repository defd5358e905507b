/*!
# PocketWiki

PocketWiki is a portable personal wiki. All entries live in a single JSON
document inside one folder, and every change that would overwrite existing
entries first copies the previous document into a timestamped backup. Backups
can be listed, restored, merged into the current entries, and deleted.

## Core Features

- Load and save the whole entry list over a small JSON HTTP API
- Automatic `auto_` backups before overwriting, with count-based retention
- Manual backups, and restores that keep a `restore_safety_` copy of what they replace
- Merging a backup into the current entries with id and title collision handling
- Offline CLI subcommands against the same data directory

## Architecture

- `cli`: Command-line interface handling using clap
- `config`: Configuration loading and validation
- `errors`: Error handling infrastructure
- `store`: The entry model and the store file
- `backup`: Snapshot creation, listing, retention and deletion
- `ops`: Restore, merge and payload validation
- `wiki`: Facade tying the store and backups together
- `server`: The axum HTTP API

## Usage Example

```rust,no_run
use pocketwiki::{Config, Wiki};

fn main() -> pocketwiki::AppResult<()> {
    let config = Config::load()?;
    config.validate()?;
    config.ensure_directories()?;

    let wiki = Wiki::open(&config);
    for record in wiki.list_backups()? {
        println!("{}", record.filename);
    }
    Ok(())
}
```
*/

/// Timestamped snapshots of the store
pub mod backup;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Injectable time source
pub mod clock;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Error types and utilities for error handling
pub mod errors;
/// Tracing subscriber setup
pub mod logging;
/// Restore, merge and save operations
pub mod ops;
/// HTTP API
pub mod server;
/// The entry store
pub mod store;
/// Facade over one wiki directory
pub mod wiki;

// Re-export important types for convenience
pub use backup::{BackupKind, BackupManager, BackupRecord};
pub use cli::CliArgs;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use store::{Entry, EntryStore};
pub use wiki::Wiki;
