use super::{require_file, require_path, Error};
use std::io;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_io_kinds_map_onto_taxonomy() {
    let path = Path::new("some/file.md");

    let err = Error::from_io(io::Error::from(io::ErrorKind::NotFound), path);
    assert!(matches!(err, Error::NotFound { ref path } if path == Path::new("some/file.md")));

    let err = Error::from_io(io::Error::from(io::ErrorKind::PermissionDenied), path);
    assert!(matches!(err, Error::PermissionDenied { .. }));

    let err = Error::from_io(io::Error::from(io::ErrorKind::InvalidData), path);
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = Error::from_io(io::Error::other("boom"), path);
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_empty_path_is_invalid_input() {
    assert!(matches!(require_path(Path::new("")), Err(Error::InvalidInput(_))));
}

#[test]
fn test_directory_is_rejected_as_file() {
    let dir = tempdir().unwrap();
    let err = require_file(dir.path()).unwrap_err();
    assert!(matches!(err, Error::IsADirectory { .. }));
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let err = require_file(&dir.path().join("absent.md")).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_recoverable_variants() {
    let conflict = Error::WriteConflict {
        path: "a.md".into(),
    };
    let missing = Error::MissingReference {
        hash: "ABCD1234".to_string(),
        path: "ABCD1234.md".into(),
    };
    assert!(conflict.is_recoverable());
    assert!(missing.is_recoverable());
    assert!(!Error::InvalidRange { start: 2, end: 1 }.is_recoverable());
}
