//! Snapshot Format Tests
//!
//! Tests verify:
//! - Encoded snapshots decode to the same mapping
//! - Truncation and bit flips are detected as corruption
//! - Binary values survive untouched

use std::collections::HashMap;

use bytes::Bytes;
use snapkv::snapshot::{decode_snapshot, encode_snapshot, CHECKSUM_SIZE};
use snapkv::SnapError;

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_entries() -> HashMap<String, Bytes> {
    let mut entries = HashMap::new();
    entries.insert("apple".to_string(), Bytes::from_static(b"red"));
    entries.insert("banana".to_string(), Bytes::from_static(b"yellow"));
    entries.insert("binary".to_string(), Bytes::from_static(b"\x00\x01\xFF\xFE\x00"));
    entries.insert("empty".to_string(), Bytes::new());
    entries.insert("ключ".to_string(), Bytes::from_static("значение".as_bytes()));
    entries
}

fn assert_corrupt(bytes: &[u8]) {
    match decode_snapshot(bytes) {
        Err(SnapError::SnapshotCorruption(_)) => {}
        other => panic!("Expected SnapshotCorruption, got {:?}", other),
    }
}

// =============================================================================
// Decode Tests
// =============================================================================

#[test]
fn test_decode_restores_mapping() {
    let entries = sample_entries();
    let decoded = decode_snapshot(&encode_snapshot(&entries).unwrap()).unwrap();
    assert_eq!(decoded, entries);
}

#[test]
fn test_large_value_survives() {
    let mut entries = HashMap::new();
    entries.insert("large".to_string(), Bytes::from(vec![0xAB; 100_000]));

    let decoded = decode_snapshot(&encode_snapshot(&entries).unwrap()).unwrap();
    assert_eq!(decoded["large"].len(), 100_000);
    assert!(decoded["large"].iter().all(|&b| b == 0xAB));
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_empty_input_is_corrupt() {
    assert_corrupt(&[]);
}

#[test]
fn test_shorter_than_checksum_is_corrupt() {
    assert_corrupt(&[0u8; CHECKSUM_SIZE - 1]);
}

#[test]
fn test_truncated_tail_is_corrupt() {
    let encoded = encode_snapshot(&sample_entries()).unwrap();
    assert_corrupt(&encoded[..encoded.len() - 1]);
    assert_corrupt(&encoded[..encoded.len() / 2]);
}

#[test]
fn test_flipped_body_bit_is_corrupt() {
    let mut encoded = encode_snapshot(&sample_entries()).unwrap();
    encoded[10] ^= 0x01;
    assert_corrupt(&encoded);
}

#[test]
fn test_flipped_checksum_bit_is_corrupt() {
    let mut encoded = encode_snapshot(&sample_entries()).unwrap();
    let last = encoded.len() - 1;
    encoded[last] ^= 0x80;
    assert_corrupt(&encoded);
}

#[test]
fn test_valid_checksum_over_garbage_is_corrupt() {
    // Body that is not a bincode map, with a correct CRC
    let body = b"not a snapshot at all".to_vec();
    let mut bytes = body.clone();
    bytes.extend_from_slice(&crc32fast::hash(&body).to_be_bytes());
    assert_corrupt(&bytes);
}
