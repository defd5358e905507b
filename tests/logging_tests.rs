
use pocketwiki::store::DataDirLock;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;
use test_helpers::base_pocketwiki_command;

/// Every stderr line in JSON mode is a JSON object carrying the root span.
#[test]
fn test_json_log_format() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("wiki");

    let output = base_pocketwiki_command(temp_dir.path())
        .args(["backups", "--log-format", "json", "--verbose", "--dir"])
        .arg(&root)
        .output()?;
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr)?;
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    assert!(!lines.is_empty(), "verbose run should log something");
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line)?;
        assert!(value.get("level").is_some());
        assert!(line.contains("app_invocation"), "missing root span: {}", line);
    }
    Ok(())
}

/// A second process on a locked directory fails and logs the failure once.
#[test]
fn test_lock_contention_is_reported_once() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("wiki");
    fs::create_dir_all(&root)?;
    let _held = DataDirLock::acquire(&root)?;

    let output = base_pocketwiki_command(temp_dir.path())
        .args(["backups", "--log-format", "json", "--dir"])
        .arg(&root)
        .output()?;
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr)?;
    let logged = stderr
        .lines()
        .filter(|l| l.contains("Command failed"))
        .count();
    assert_eq!(logged, 1);
    assert!(predicate::str::contains("already in use").eval(&stderr));
    Ok(())
}
