
use pocketwiki::{AppError, BackupKind, Entry};
use serde_json::json;
use std::fs;
use tempfile::tempdir;
use test_helpers::{backup_names, wiki_at};

#[test]
fn test_store_file_equals_last_write() {
    let dir = tempdir().unwrap();
    let (config, wiki) = wiki_at(dir.path());

    let payloads = [
        vec![Entry::new(1, "A")],
        vec![Entry::new(1, "A"), Entry::new(2, "B")],
        vec![Entry::new(3, "C")],
    ];
    for payload in &payloads {
        wiki.save(payload).unwrap();
        assert_eq!(&wiki.load().unwrap(), payload);
    }

    let on_disk = fs::read(config.data_file()).unwrap();
    assert_eq!(on_disk, Entry::to_document(&payloads[2]).unwrap());
}

#[test]
fn test_unknown_fields_pass_through() {
    let dir = tempdir().unwrap();
    let (_, wiki) = wiki_at(dir.path());

    let entry = Entry::new(7, "Recipe")
        .with_field("category", "Food")
        .with_field("tags", json!(["dinner"]))
        .with_field("pinned", true)
        .with_field("images", json!([{"name": "a.png", "data": "data:image/png;base64,AAAA"}]));
    wiki.save(std::slice::from_ref(&entry)).unwrap();

    let loaded = wiki.load().unwrap();
    assert_eq!(loaded, vec![entry]);
    assert_eq!(loaded[0].fields["category"], json!("Food"));
    assert_eq!(loaded[0].fields["pinned"], json!(true));
}

#[test]
fn test_each_overwrite_backs_up_the_previous_bytes() {
    let dir = tempdir().unwrap();
    let (config, wiki) = wiki_at(dir.path());

    wiki.save(&[Entry::new(1, "A")]).unwrap();
    let first = fs::read(config.data_file()).unwrap();
    let outcome = wiki.save(&[Entry::new(1, "A2")]).unwrap();
    let second = fs::read(config.data_file()).unwrap();
    let outcome2 = wiki.save(&[Entry::new(1, "A3")]).unwrap();

    let b1 = outcome.backup.unwrap();
    let b2 = outcome2.backup.unwrap();
    assert_eq!(b1.kind, Some(BackupKind::Auto));
    assert!(b1.filename.starts_with("auto_"));
    assert_eq!(fs::read(config.backup_dir().join(&b1.filename)).unwrap(), first);
    assert_eq!(fs::read(config.backup_dir().join(&b2.filename)).unwrap(), second);
    assert_eq!(backup_names(&wiki).len(), 2);
}

#[test]
fn test_empty_overwrite_is_backed_up_and_flagged() {
    let dir = tempdir().unwrap();
    let (_, wiki) = wiki_at(dir.path());

    wiki.save(&[Entry::new(1, "A"), Entry::new(2, "B")]).unwrap();
    let outcome = wiki.save(&[]).unwrap();

    assert!(outcome.emptied_existing);
    let backup = outcome.backup.unwrap();
    assert_eq!(backup.entry_count, Some(2));
    assert!(wiki.load().unwrap().is_empty());
}

#[test]
fn test_retention_keeps_thirty_newest() {
    let dir = tempdir().unwrap();
    let (_, wiki) = wiki_at(dir.path());

    wiki.save(&[Entry::new(0, "v0")]).unwrap();
    let mut created = Vec::new();
    for i in 1..=31 {
        let outcome = wiki.save(&[Entry::new(i, format!("v{}", i))]).unwrap();
        created.push(outcome.backup.unwrap().filename);
    }

    let names = backup_names(&wiki);
    assert_eq!(names.len(), 30);
    assert!(!names.contains(&created[0]), "oldest backup should be pruned");
    assert!(names.contains(&created[30]));
}

#[test]
fn test_corrupt_store_fails_load() {
    let dir = tempdir().unwrap();
    let (config, wiki) = wiki_at(dir.path());
    fs::write(config.data_file(), "{\"not\":\"an array\"}").unwrap();

    assert!(matches!(wiki.load(), Err(AppError::CorruptData { .. })));
}
