use crate::constants::{APP_DESCRIPTION, APP_NAME, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use clap::{Args, Parser, Subcommand};

/// A portable personal wiki with timestamped JSON backups
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Wiki directory (overrides POCKETWIKI_DIR)
    #[clap(long, global = true, value_name = "PATH")]
    pub dir: Option<String>,

    /// Number of backups to keep (overrides POCKETWIKI_MAX_BACKUPS)
    #[clap(long, global = true, value_name = "N")]
    pub max_backups: Option<usize>,

    /// Print verbose output
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[clap(long, global = true, value_name = "FORMAT", default_value = LOG_FORMAT_TEXT,
           value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: String,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the wiki over HTTP (default)
    Serve(ServeArgs),

    /// List backups, newest first
    Backups,

    /// Take a manual backup of the current data
    Snapshot,

    /// Replace the current data with a backup
    Restore {
        /// Backup file name, e.g. manual_20240101_120000.json
        filename: String,
    },

    /// Merge a backup's entries into the current data
    Merge {
        /// Backup file name
        filename: String,

        /// Write the merged result (without this the merge is only reported)
        #[clap(long)]
        apply: bool,
    },

    /// Delete a backup
    Delete {
        /// Backup file name
        filename: String,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServeArgs {
    /// Address to bind (overrides POCKETWIKI_HOST)
    #[clap(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides POCKETWIKI_PORT)
    #[clap(short = 'p', long)]
    pub port: Option<u16>,

    /// Don't write a welcome entry into a new wiki
    #[clap(long)]
    pub no_seed: bool,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        CliArgs::parse_from(std::env::args())
    }

    /// The command to run; `serve` with defaults when none was given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    }
}
