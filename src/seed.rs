//! Seed data
//!
//! Deterministic datasets for benchmarks, tests and `snapkv-cli seed`.

use std::collections::HashMap;

use bytes::Bytes;

/// Number of keys in the default seed dataset
pub const DEFAULT_SEED_KEYS: usize = 1000;

/// Smallest generated value, in bytes
pub const MIN_VALUE_SIZE: usize = 16;

/// Largest generated value, in bytes
pub const MAX_VALUE_SIZE: usize = 1000;

/// Key for the `i`-th seed entry
pub fn seed_key(i: usize) -> String {
    format!("key-{}", i)
}

/// Generate `count` entries `key-{i}` → `"v"` repeated 16..=1000 times
pub fn generate_entries(count: usize) -> HashMap<String, Bytes> {
    let span = MAX_VALUE_SIZE - MIN_VALUE_SIZE + 1;
    (0..count)
        .map(|i| {
            let size = MIN_VALUE_SIZE + i % span;
            (seed_key(i), Bytes::from(vec![b'v'; size]))
        })
        .collect()
}
