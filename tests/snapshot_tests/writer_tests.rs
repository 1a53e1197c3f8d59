//! Tests for Snapshot Writer and Reader
//!
//! These tests verify:
//! - Written snapshots load back identically
//! - Writes fully replace the previous file (no appending)
//! - No temp file is left behind
//! - Missing files load as `None`, corrupt files fail
//! - Stale temp files from interrupted writes are discarded

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use bytes::Bytes;
use snapkv::snapshot::{SnapshotReader, SnapshotWriter};
use snapkv::SnapError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_snapshot() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.snap");
    (temp_dir, path)
}

fn entries(pairs: &[(&str, &str)]) -> HashMap<String, Bytes> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Bytes::copy_from_slice(v.as_bytes())))
        .collect()
}

// =============================================================================
// Write / Load Tests
// =============================================================================

#[test]
fn test_write_then_load() {
    let (_temp, path) = setup_temp_snapshot();
    let data = entries(&[("a", "1"), ("b", "2")]);

    let bytes = SnapshotWriter::write(&path, &data).unwrap();

    assert_eq!(bytes, fs::metadata(&path).unwrap().len());
    assert_eq!(SnapshotReader::load(&path).unwrap(), Some(data));
}

#[test]
fn test_write_replaces_previous_contents() {
    let (_temp, path) = setup_temp_snapshot();

    SnapshotWriter::write(&path, &entries(&[("a", "1"), ("b", "2"), ("c", "3")])).unwrap();
    SnapshotWriter::write(&path, &entries(&[("a", "9")])).unwrap();

    let loaded = SnapshotReader::load(&path).unwrap().unwrap();
    assert_eq!(loaded, entries(&[("a", "9")]));
}

#[test]
fn test_write_empty_dataset() {
    let (_temp, path) = setup_temp_snapshot();

    SnapshotWriter::write(&path, &HashMap::new()).unwrap();

    assert_eq!(SnapshotReader::load(&path).unwrap(), Some(HashMap::new()));
}

#[test]
fn test_write_leaves_no_temp_file() {
    let (_temp, path) = setup_temp_snapshot();

    SnapshotWriter::write(&path, &entries(&[("a", "1")])).unwrap();

    assert!(path.exists());
    assert!(!SnapshotWriter::temp_path(&path).exists());
}

#[test]
fn test_write_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("dir").join("store.snap");

    SnapshotWriter::write(&path, &entries(&[("a", "1")])).unwrap();

    assert!(path.exists());
}

#[test]
fn test_failed_write_keeps_old_snapshot() {
    let (_temp, path) = setup_temp_snapshot();
    SnapshotWriter::write(&path, &entries(&[("a", "1")])).unwrap();

    // A directory where the temp file should go makes File::create fail
    let tmp = SnapshotWriter::temp_path(&path);
    fs::create_dir(&tmp).unwrap();

    let result = SnapshotWriter::write(&path, &entries(&[("a", "2")]));
    assert!(matches!(result, Err(SnapError::Io(_))));

    fs::remove_dir(&tmp).unwrap();
    assert_eq!(SnapshotReader::load(&path).unwrap(), Some(entries(&[("a", "1")])));
}

// =============================================================================
// Load Edge Cases
// =============================================================================

#[test]
fn test_load_missing_file_is_none() {
    let (_temp, path) = setup_temp_snapshot();
    assert_eq!(SnapshotReader::load(&path).unwrap(), None);
}

#[test]
fn test_load_corrupt_file_fails() {
    let (_temp, path) = setup_temp_snapshot();
    fs::write(&path, b"definitely not a snapshot").unwrap();

    assert!(matches!(
        SnapshotReader::load(&path),
        Err(SnapError::SnapshotCorruption(_))
    ));
}

#[test]
fn test_load_empty_file_fails() {
    let (_temp, path) = setup_temp_snapshot();
    fs::write(&path, b"").unwrap();

    assert!(matches!(
        SnapshotReader::load(&path),
        Err(SnapError::SnapshotCorruption(_))
    ));
}

#[test]
fn test_load_directory_fails() {
    let (_temp, path) = setup_temp_snapshot();
    fs::create_dir(&path).unwrap();

    assert!(SnapshotReader::load(&path).is_err());
}

#[test]
fn test_load_discards_stale_temp_file() {
    let (_temp, path) = setup_temp_snapshot();
    SnapshotWriter::write(&path, &entries(&[("a", "1")])).unwrap();

    // Simulate a crash mid-write: half-written temp file next to the snapshot
    let tmp = SnapshotWriter::temp_path(&path);
    fs::write(&tmp, b"partial").unwrap();

    let loaded = SnapshotReader::load(&path).unwrap();

    assert_eq!(loaded, Some(entries(&[("a", "1")])));
    assert!(!tmp.exists());
}
