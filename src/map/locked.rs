//! Whole-dataset lock map
//!
//! HashMap-based map with a single parking_lot RwLock.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

use super::ConcurrentMap;

/// Map guarded by one shared/exclusive lock
///
/// ## Concurrency:
/// - `get`, `len`, `snapshot`: shared lock (many concurrent readers)
/// - `set`, `delete`, `replace`: exclusive lock, held for one mutation
/// - Values are `Bytes`, so handing one out is a refcount bump, not a copy
#[derive(Debug, Default)]
pub struct LockedMap {
    data: RwLock<HashMap<String, Bytes>>,
}

impl LockedMap {
    /// Create a new empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map pre-populated with `entries`
    pub fn with_entries(entries: HashMap<String, Bytes>) -> Self {
        Self {
            data: RwLock::new(entries),
        }
    }
}

impl ConcurrentMap for LockedMap {
    fn set(&self, key: String, value: Bytes) {
        self.data.write().insert(key, value);
    }

    fn get(&self, key: &str) -> Option<Bytes> {
        self.data.read().get(key).cloned()
    }

    fn delete(&self, key: &str) {
        self.data.write().remove(key);
    }

    fn len(&self) -> usize {
        self.data.read().len()
    }

    fn snapshot(&self) -> HashMap<String, Bytes> {
        self.data.read().clone()
    }

    fn replace(&self, entries: HashMap<String, Bytes>) {
        // Drop the old map after releasing the lock
        let old = std::mem::replace(&mut *self.data.write(), entries);
        drop(old);
    }
}
