/*!
# PocketWiki - A Portable Personal Wiki

Serves the wiki's JSON API, or runs one backup operation against the data
directory and exits.

## Usage

```text
pocketwiki [OPTIONS] [COMMAND]

Commands:
  serve     Serve the wiki over HTTP (default)
  backups   List backups, newest first
  snapshot  Take a manual backup of the current data
  restore   Replace the current data with a backup
  merge     Merge a backup's entries into the current data
  delete    Delete a backup

Options:
      --dir <PATH>            Wiki directory (overrides POCKETWIKI_DIR)
      --max-backups <N>       Number of backups to keep
  -v, --verbose               Print verbose output
      --log-format <FORMAT>   Log output format [default: text] [possible values: text, json]
```

## Configuration

- `POCKETWIKI_DIR`: wiki directory (defaults to `~/PocketWiki`)
- `POCKETWIKI_HOST` / `POCKETWIKI_PORT`: listen address (defaults to `127.0.0.1:3000`)
- `POCKETWIKI_MAX_BACKUPS`: retention limit (defaults to 30)
- `POCKETWIKI_ATOMIC_WRITES`: write the store via temp file and rename
*/

use pocketwiki::cli::{CliArgs, Command, ServeArgs};
use pocketwiki::config::Config;
use pocketwiki::constants::{BACKUP_LOCAL_DISPLAY_FORMAT, TRACING_ROOT_SPAN_NAME, UNKNOWN_COUNT_MARKER};
use pocketwiki::errors::{AppError, AppResult};
use pocketwiki::logging::init_tracing;
use pocketwiki::server::{self, AppState};
use pocketwiki::store::DataDirLock;
use pocketwiki::Wiki;
use std::process::ExitCode;
use tracing::{debug, error, info, info_span, Instrument, Span};
use uuid::Uuid;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = init_tracing(&args.log_format, args.verbose) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let correlation_id = Uuid::new_v4();
    let root_span = info_span!(TRACING_ROOT_SPAN_NAME, correlation_id = %correlation_id);
    let _guard = root_span.enter();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> AppResult<()> {
    debug!(?args, "Parsed arguments");
    let command = args.command();

    let mut config = Config::load()?;
    if let Some(dir) = args.dir.as_deref() {
        config.set_root_dir(dir)?;
    }
    if let Some(max) = args.max_backups {
        config.max_backups = max;
    }
    if let Command::Serve(serve) = &command {
        if let Some(host) = &serve.host {
            config.host = host.clone();
        }
        if let Some(port) = serve.port {
            config.port = port;
        }
    }
    config.validate()?;
    config.ensure_directories()?;

    // Held until `run` returns.
    let _lock = DataDirLock::acquire(&config.root_dir)?;

    let wiki = Wiki::open(&config);
    match command {
        Command::Serve(serve) => run_server(&config, wiki, &serve),
        Command::Backups => print_backups(&wiki),
        Command::Snapshot => {
            let record = wiki.manual_backup()?;
            println!("Created {}", record.filename);
            Ok(())
        }
        Command::Restore { filename } => {
            let report = wiki.restore(&filename)?;
            println!(
                "Restored {} entries from {}",
                report.entries.len(),
                report.source
            );
            if let Some(safety) = report.safety_backup {
                println!("Previous data kept as {}", safety.filename);
            }
            Ok(())
        }
        Command::Merge { filename, apply } => {
            let report = wiki.merge(&filename)?;
            println!(
                "{} entries from {} ({} new ids, {} renamed), {} total",
                report.added_count,
                filename,
                report.reassigned,
                report.renamed,
                report.merged.len()
            );
            if apply {
                let outcome = wiki.save(&report.merged)?;
                println!("Saved {} entries", outcome.entries);
                if let Some(backup) = outcome.backup {
                    println!("Previous data kept as {}", backup.filename);
                }
                for name in outcome.pruned {
                    println!("Removed old backup {}", name);
                }
            } else {
                println!("Dry run; pass --apply to save the merged entries");
            }
            Ok(())
        }
        Command::Delete { filename } => {
            wiki.delete_backup(&filename)?;
            println!("Deleted {}", filename);
            Ok(())
        }
    }
}

fn run_server(config: &Config, wiki: Wiki, serve: &ServeArgs) -> AppResult<()> {
    if !serve.no_seed && wiki.seed_if_missing()? {
        info!("Created a new wiki");
    }

    let address = config.bind_address();
    info!(
        url = %format!("http://{}", address),
        data_file = %config.data_file().display(),
        backup_dir = %config.backup_dir().display(),
        max_backups = config.max_backups,
        atomic_writes = config.atomic_writes,
        "Starting pocketwiki"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(AppError::Io)?;
    let state = AppState::new(wiki);
    runtime.block_on(server::serve(state, &address).instrument(Span::current()))
}

fn print_backups(wiki: &Wiki) -> AppResult<()> {
    let records = wiki.list_backups()?;
    if records.is_empty() {
        println!("No backups");
        return Ok(());
    }

    for record in records {
        let count = record
            .entry_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| UNKNOWN_COUNT_MARKER.to_string());
        println!(
            "{}  {}  {:>6} entries  {:>10} bytes",
            record.created_at.format(BACKUP_LOCAL_DISPLAY_FORMAT),
            record.filename,
            count,
            record.size
        );
    }
    Ok(())
}
