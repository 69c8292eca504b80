use elog::rotation::{rotated_files, shift_files};
use elog::sink::FileSink;
use elog::ElogError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_rotation_scenario() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("app.log");
    write(&active, "current");
    write(&dir.path().join("app.log.0"), "zero");
    write(&dir.path().join("app.log.1"), "one");

    let mut sink = FileSink::open(&active, true).unwrap();
    sink.rotate().unwrap();

    assert_eq!(read(&dir.path().join("app.log.2")), "one");
    assert_eq!(read(&dir.path().join("app.log.1")), "zero");
    assert_eq!(read(&dir.path().join("app.log.0")), "current");
    assert_eq!(read(&active), "");
    assert_eq!(sink.bytes_written(), 0);

    // The reopened file is the one the sink writes to.
    drop(sink);
    let mut file = fs::OpenOptions::new().append(true).open(&active).unwrap();
    file.write_all(b"fresh").unwrap();
    assert_eq!(read(&active), "fresh");
}

#[test]
fn test_first_rotation_without_history() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("app.log");
    write(&active, "only");
    shift_files(&active).unwrap();
    assert_eq!(read(&dir.path().join("app.log.0")), "only");
    assert!(!active.exists());
}

#[test]
fn test_gaps_and_large_indices() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("app.log");
    write(&active, "a");
    write(&dir.path().join("app.log.3"), "three");
    write(&dir.path().join("app.log.10"), "ten");
    shift_files(&active).unwrap();

    assert_eq!(read(&dir.path().join("app.log.11")), "ten");
    assert_eq!(read(&dir.path().join("app.log.4")), "three");
    assert_eq!(read(&dir.path().join("app.log.0")), "a");
    assert!(!dir.path().join("app.log.3").exists());
    assert!(!dir.path().join("app.log.10").exists());
}

#[test]
fn test_unrelated_files_untouched() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("app.log");
    write(&active, "a");
    for name in ["app.log.old", "app.log.1.gz", "other.log.0", "app.logs.0", "xapp.log.0"] {
        write(&dir.path().join(name), name);
    }
    shift_files(&active).unwrap();
    for name in ["app.log.old", "app.log.1.gz", "other.log.0", "app.logs.0", "xapp.log.0"] {
        assert_eq!(read(&dir.path().join(name)), name);
    }
}

#[test]
fn test_special_characters_in_name_are_literal() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("a+b(1).log");
    write(&active, "x");
    write(&dir.path().join("a+b(1).log.0"), "y");
    write(&dir.path().join("aab(1).log.0"), "decoy");
    let found = rotated_files(&active).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, 0);

    shift_files(&active).unwrap();
    assert_eq!(read(&dir.path().join("a+b(1).log.1")), "y");
    assert_eq!(read(&dir.path().join("aab(1).log.0")), "decoy");
}

#[test]
fn test_listing_is_highest_first() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("app.log");
    for i in [2u64, 0, 7, 1] {
        write(&dir.path().join(format!("app.log.{}", i)), "");
    }
    let indices: Vec<_> = rotated_files(&active).unwrap().into_iter().map(|(i, _)| i).collect();
    assert_eq!(indices, vec![7, 2, 1, 0]);
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("gone").join("app.log");
    let err = shift_files(&active).unwrap_err();
    assert!(matches!(err, ElogError::Rotation { .. }));
}

#[test]
fn test_missing_active_file_is_an_error() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("app.log");
    write(&dir.path().join("app.log.0"), "zero");
    let err = shift_files(&active).unwrap_err();
    assert!(matches!(err, ElogError::Rotation { .. }));
    // No rollback: the history was already shifted.
    assert_eq!(read(&dir.path().join("app.log.1")), "zero");
}

#[test]
fn test_zero_padded_sibling_is_not_renumbered() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("app.log");
    write(&active, "current");
    write(&dir.path().join("app.log.1"), "one");
    write(&dir.path().join("app.log.01"), "padded");
    shift_files(&active).unwrap();

    assert_eq!(read(&dir.path().join("app.log.0")), "current");
    assert_eq!(read(&dir.path().join("app.log.2")), "one");
    assert_eq!(read(&dir.path().join("app.log.01")), "padded");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
}

#[test]
fn test_index_at_u64_max_fails_without_renaming() {
    let dir = tempdir().unwrap();
    let active = dir.path().join("app.log");
    let top = dir.path().join(format!("app.log.{}", u64::MAX));
    write(&active, "current");
    write(&dir.path().join("app.log.0"), "zero");
    write(&top, "top");

    let err = shift_files(&active).unwrap_err();
    assert!(matches!(err, ElogError::Rotation { ref path, .. } if path == &top));
    assert_eq!(read(&active), "current");
    assert_eq!(read(&dir.path().join("app.log.0")), "zero");
    assert_eq!(read(&top), "top");
    assert!(!dir.path().join("app.log.1").exists());
}
