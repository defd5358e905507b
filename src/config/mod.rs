//! Configuration management for the pocketwiki application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. Command-line flags override environment values.
//!
//! # Environment Variables
//!
//! - `POCKETWIKI_DIR`: Wiki root directory (defaults to ~/PocketWiki)
//! - `POCKETWIKI_HOST`: Address the HTTP server binds to (defaults to 127.0.0.1)
//! - `POCKETWIKI_PORT`: HTTP port (defaults to 3000)
//! - `POCKETWIKI_MAX_BACKUPS`: Number of backups kept after pruning (defaults to 30)
//! - `POCKETWIKI_ATOMIC_WRITES`: Write the store via temp file + rename (defaults to off)
//! - `HOME`: Used for expanding the default wiki directory path

use crate::constants::{
    BACKUP_SUBDIR, DATA_FILE_NAME, DATA_SUBDIR, DEFAULT_HOST, DEFAULT_MAX_BACKUPS, DEFAULT_PORT,
    DEFAULT_WIKI_SUBDIR, ENV_VAR_HOME, ENV_VAR_WIKI_ATOMIC_WRITES, ENV_VAR_WIKI_DIR,
    ENV_VAR_WIKI_HOST, ENV_VAR_WIKI_MAX_BACKUPS, ENV_VAR_WIKI_PORT,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Configuration for the pocketwiki application.
///
/// Every component receives the values it needs from here at construction;
/// nothing reads the environment after startup.
///
/// # Examples
///
/// ```
/// use pocketwiki::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     root_dir: PathBuf::from("/srv/wiki"),
///     ..Config::default()
/// };
/// assert_eq!(config.data_file(), PathBuf::from("/srv/wiki/data/wiki_data.json"));
/// assert_eq!(config.backup_dir(), PathBuf::from("/srv/wiki/backups"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `data/` and `backups/`.
    pub root_dir: PathBuf,

    /// Address the HTTP server binds to.
    pub host: String,

    /// HTTP port.
    pub port: u16,

    /// Number of backups kept after each pruning pass.
    pub max_backups: usize,

    /// Replace the store via a temporary file and rename instead of in place.
    pub atomic_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root_dir: PathBuf::from(""),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_backups: DEFAULT_MAX_BACKUPS,
            atomic_writes: false,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The wiki directory is expanded with `shellexpand`, so `~` and `$VAR`
    /// references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The wiki directory path expansion fails
    /// - A numeric or boolean variable doesn't parse
    pub fn load() -> AppResult<Self> {
        let root_dir_str = env::var(ENV_VAR_WIKI_DIR).unwrap_or_else(|_| {
            let home = env::var(ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, DEFAULT_WIKI_SUBDIR)
        });
        let root_dir = expand_path(&root_dir_str)?;

        let config = Config {
            root_dir,
            host: env::var(ENV_VAR_WIKI_HOST).unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parse_env(ENV_VAR_WIKI_PORT, DEFAULT_PORT)?,
            max_backups: parse_env(ENV_VAR_WIKI_MAX_BACKUPS, DEFAULT_MAX_BACKUPS)?,
            atomic_writes: parse_env_flag(ENV_VAR_WIKI_ATOMIC_WRITES)?,
        };
        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Sets the wiki directory from a user-supplied (possibly `~`-prefixed) path.
    pub fn set_root_dir(&mut self, raw: &str) -> AppResult<()> {
        self.root_dir = expand_path(raw)?;
        Ok(())
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the wiki directory is empty or relative,
    /// the host is empty, or `max_backups` is zero.
    pub fn validate(&self) -> AppResult<()> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Wiki directory path is empty".to_string()));
        }

        if !self.root_dir.is_absolute() {
            return Err(AppError::Config(
                "Wiki directory must be an absolute path".to_string(),
            ));
        }

        if self.host.trim().is_empty() {
            return Err(AppError::Config("Bind host is empty".to_string()));
        }

        if self.max_backups == 0 {
            return Err(AppError::Config(
                "Backup retention must keep at least one backup".to_string(),
            ));
        }

        Ok(())
    }

    pub fn data_file(&self) -> PathBuf {
        self.root_dir.join(DATA_SUBDIR).join(DATA_FILE_NAME)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.root_dir.join(BACKUP_SUBDIR)
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Creates the wiki, data and backup directories if they don't exist.
    pub fn ensure_directories(&self) -> AppResult<()> {
        for dir in [
            self.root_dir.clone(),
            self.root_dir.join(DATA_SUBDIR),
            self.backup_dir(),
        ] {
            create_dir(&dir)?;
        }
        Ok(())
    }
}

fn create_dir(dir: &Path) -> AppResult<()> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create directory {}: {}", dir.display(), e),
        ))
    })
}

fn expand_path(raw: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

fn parse_env<T>(name: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid value for {}: {:?} ({})", name, raw, e))),
        Err(_) => Ok(default),
    }
}

fn parse_env_flag(name: &str) -> AppResult<bool> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(AppError::Config(format!(
                "Invalid value for {}: {:?} (expected true or false)",
                name, raw
            ))),
        },
        Err(_) => Ok(false),
    }
}
