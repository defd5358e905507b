use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::tempdir;

use pocketwiki::config::Config;
use pocketwiki::errors::AppError;

const VARS: [&str; 6] = [
    "POCKETWIKI_DIR",
    "POCKETWIKI_HOST",
    "POCKETWIKI_PORT",
    "POCKETWIKI_MAX_BACKUPS",
    "POCKETWIKI_ATOMIC_WRITES",
    "HOME",
];

/// Runs `f` with the given variables set and every other config variable
/// cleared, restoring the original environment afterwards.
fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
    let saved: Vec<(&str, Option<String>)> =
        VARS.iter().map(|name| (*name, env::var(name).ok())).collect();
    for name in VARS {
        env::remove_var(name);
    }
    for (name, value) in vars {
        env::set_var(name, value);
    }

    f();

    for (name, value) in saved {
        match value {
            Some(val) => env::set_var(name, val),
            None => env::remove_var(name),
        }
    }
}

#[test]
#[serial]
fn test_config_load_with_environment_vars() {
    let temp_dir = tempdir().unwrap();
    let dir_path = temp_dir.path().to_string_lossy().to_string();

    with_env(
        &[
            ("POCKETWIKI_DIR", dir_path.as_str()),
            ("POCKETWIKI_HOST", "0.0.0.0"),
            ("POCKETWIKI_PORT", "8123"),
            ("POCKETWIKI_MAX_BACKUPS", "5"),
            ("POCKETWIKI_ATOMIC_WRITES", "yes"),
        ],
        || {
            let config = Config::load().unwrap();
            assert_eq!(config.root_dir, PathBuf::from(&dir_path));
            assert_eq!(config.bind_address(), "0.0.0.0:8123");
            assert_eq!(config.max_backups, 5);
            assert!(config.atomic_writes);
            assert!(config.validate().is_ok());
        },
    );
}

#[test]
#[serial]
fn test_config_defaults_use_home() {
    with_env(&[("HOME", "/home/wikiuser")], || {
        let config = Config::load().unwrap();
        assert_eq!(config.root_dir, PathBuf::from("/home/wikiuser/PocketWiki"));
        assert_eq!(
            config.data_file(),
            PathBuf::from("/home/wikiuser/PocketWiki/data/wiki_data.json")
        );
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.max_backups, 30);
        assert!(!config.atomic_writes);
    });
}

#[test]
#[serial]
fn test_tilde_is_expanded() {
    with_env(
        &[("HOME", "/home/wikiuser"), ("POCKETWIKI_DIR", "~/notes")],
        || {
            let config = Config::load().unwrap();
            assert_eq!(config.root_dir, PathBuf::from("/home/wikiuser/notes"));
        },
    );
}

#[test]
#[serial]
fn test_invalid_values_are_config_errors() {
    with_env(&[("HOME", "/tmp"), ("POCKETWIKI_MAX_BACKUPS", "lots")], || {
        assert!(matches!(Config::load(), Err(AppError::Config(_))));
    });
    with_env(&[("HOME", "/tmp"), ("POCKETWIKI_ATOMIC_WRITES", "maybe")], || {
        assert!(matches!(Config::load(), Err(AppError::Config(_))));
    });
    with_env(&[("HOME", "/tmp"), ("POCKETWIKI_MAX_BACKUPS", "0")], || {
        let config = Config::load().unwrap();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    });
}

#[test]
#[serial]
fn test_relative_directory_fails_validation() {
    with_env(&[("POCKETWIKI_DIR", "relative/wiki")], || {
        let config = Config::load().unwrap();
        assert!(config.validate().is_err());
    });
}
