//! Map Tests
//!
//! Tests verify:
//! - Basic set/get/delete operations
//! - Overwrite and delete semantics
//! - Snapshot copies are point-in-time
//! - Whole-dataset replacement
//! - Concurrent access patterns
//!
//! The contract checks are generic over `ConcurrentMap` so any lock strategy
//! can be run through them.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use snapkv::map::{ConcurrentMap, LockedMap};

// =============================================================================
// Helper Functions
// =============================================================================

fn b(s: &str) -> Bytes {
    Bytes::copy_from_slice(s.as_bytes())
}

fn check_read_your_write<M: ConcurrentMap>(map: &M) {
    map.set("key1".to_string(), b("value1"));
    assert_eq!(map.get("key1"), Some(b("value1")));

    map.set("key1".to_string(), b("value2"));
    assert_eq!(map.get("key1"), Some(b("value2")));
    assert_eq!(map.len(), 1);
}

fn check_delete_absence<M: ConcurrentMap>(map: &M) {
    map.set("key1".to_string(), b("value1"));
    map.delete("key1");
    assert_eq!(map.get("key1"), None);

    // Deleting again is a no-op
    map.delete("key1");
    map.delete("never-existed");
    assert!(map.is_empty());
}

fn check_disjoint_writers<M: ConcurrentMap>(map: Arc<M>, writers: usize, keys_per_writer: usize) {
    let mut handles = vec![];
    for t in 0..writers {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            for i in 0..keys_per_writer {
                map.set(format!("w{}_k{}", t, i), Bytes::from(format!("w{}_v{}", t, i)));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(map.len(), writers * keys_per_writer);

    let mut handles = vec![];
    for _ in 0..4 {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            for t in 0..writers {
                for i in 0..keys_per_writer {
                    let expected = Bytes::from(format!("w{}_v{}", t, i));
                    assert_eq!(map.get(&format!("w{}_k{}", t, i)), Some(expected));
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_map_is_empty() {
    let map = LockedMap::new();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
}

#[test]
fn test_get_nonexistent_key() {
    let map = LockedMap::new();
    assert_eq!(map.get("nonexistent"), None);
}

#[test]
fn test_read_your_write() {
    check_read_your_write(&LockedMap::new());
}

#[test]
fn test_delete_absence() {
    check_delete_absence(&LockedMap::new());
}

#[test]
fn test_empty_key_and_value() {
    let map = LockedMap::new();
    map.set(String::new(), Bytes::new());
    assert_eq!(map.get(""), Some(Bytes::new()));
}

// =============================================================================
// Snapshot / Replace Tests
// =============================================================================

#[test]
fn test_snapshot_is_point_in_time() {
    let map = LockedMap::new();
    map.set("a".to_string(), b("1"));

    let snap = map.snapshot();
    map.set("a".to_string(), b("2"));
    map.set("b".to_string(), b("3"));

    assert_eq!(snap.len(), 1);
    assert_eq!(snap["a"], b("1"));
    assert_eq!(map.get("a"), Some(b("2")));
}

#[test]
fn test_replace_swaps_whole_dataset() {
    let map = LockedMap::new();
    map.set("old".to_string(), b("gone"));

    let mut entries = HashMap::new();
    entries.insert("new1".to_string(), b("v1"));
    entries.insert("new2".to_string(), b("v2"));
    map.replace(entries);

    assert_eq!(map.len(), 2);
    assert_eq!(map.get("old"), None);
    assert_eq!(map.get("new1"), Some(b("v1")));
}

#[test]
fn test_with_entries() {
    let mut entries = HashMap::new();
    entries.insert("k".to_string(), b("v"));
    let map = LockedMap::with_entries(entries);
    assert_eq!(map.get("k"), Some(b("v")));
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_disjoint_writers_then_readers() {
    check_disjoint_writers(Arc::new(LockedMap::new()), 8, 250);
}

#[test]
fn test_concurrent_same_key_last_write_wins() {
    let map = Arc::new(LockedMap::new());
    let mut handles = vec![];
    for t in 0..4 {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                map.set("shared".to_string(), Bytes::from(format!("t{}", t)));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // One of the writers' values, never a torn or missing one
    let value = map.get("shared").unwrap();
    assert!(["t0", "t1", "t2", "t3"].iter().any(|v| value == v.as_bytes()));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_snapshot_during_writes_is_consistent() {
    let map = Arc::new(LockedMap::new());

    let writer = {
        let map = Arc::clone(&map);
        thread::spawn(move || {
            for i in 0..1000 {
                map.set(format!("k{}", i), Bytes::from(format!("v{}", i)));
            }
        })
    };

    for _ in 0..20 {
        let snap = map.snapshot();
        for (key, value) in &snap {
            assert_eq!(&key[1..], &String::from_utf8_lossy(value)[1..]);
        }
    }

    writer.join().unwrap();
    assert_eq!(map.snapshot().len(), 1000);
}
