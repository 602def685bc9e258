use crate::error::persistence::PersistenceError;
use crate::store::file::{read, write_with_backup};

use tempfile::TempDir;

#[test]
fn given_missing_file_when_read_then_none_is_returned() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let contents = read(&dir.path().join("absent.ini")).expect("Read should not fail");

    assert_eq!(contents, None);
}

/// **VALUE**: Verifies the previous file is copied verbatim to the backup
/// before it is overwritten.
///
/// **WHY THIS MATTERS**: The backup is the only way back if a received
/// configuration turns out to be bad.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The backup is taken after the write (backup == new contents)
/// - The backup is regenerated instead of copied
#[test]
fn given_existing_file_when_written_then_old_contents_move_to_backup() {
    // GIVEN: A config file with old contents
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.ini");
    let backup = dir.path().join("config_backup.ini");
    std::fs::write(&path, "old contents\n").expect("Failed to seed file");

    // WHEN: New contents are written
    write_with_backup(&path, &backup, "new contents\n").expect("Write should succeed");

    // THEN: File has the new text, backup has the old text
    assert_eq!(
        std::fs::read_to_string(&path).expect("Failed to read file"),
        "new contents\n"
    );
    assert_eq!(
        std::fs::read_to_string(&backup).expect("Failed to read backup"),
        "old contents\n"
    );
}

#[test]
fn given_no_previous_file_when_written_then_no_backup_is_created() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.ini");
    let backup = dir.path().join("config_backup.ini");

    write_with_backup(&path, &backup, "[A]\nX=1\n").expect("Write should succeed");

    assert!(path.exists());
    assert!(!backup.exists());
    assert_eq!(
        read(&path).expect("Read should succeed").as_deref(),
        Some("[A]\nX=1\n")
    );
}

#[test]
fn given_missing_parent_directory_when_written_then_it_is_created() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("deeper").join("config.ini");
    let backup = dir.path().join("config_backup.ini");

    write_with_backup(&path, &backup, "x").expect("Write should succeed");

    assert!(path.exists());
}

#[test]
fn given_path_is_a_directory_when_read_then_read_error_is_returned() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let result = read(dir.path());

    assert!(matches!(result, Err(PersistenceError::Read { .. })));
}
