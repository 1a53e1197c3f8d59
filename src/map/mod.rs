//! Map Module
//!
//! In-memory data structure holding the live dataset.
//!
//! ## Responsibilities
//! - Fast reads and writes in memory
//! - Many concurrent readers, serialized writers
//! - Point-in-time copies for snapshotting
//! - Whole-dataset replacement for hydration and seeding
//!
//! ## Data Structure Choice
//! The lock strategy sits behind [`ConcurrentMap`] so the engine and its tests
//! do not depend on it. The default, [`LockedMap`], is a HashMap under one
//! RwLock: a reader never waits on anything but a single mutation.

mod locked;

use std::collections::HashMap;

use bytes::Bytes;

pub use locked::LockedMap;

/// A thread-safe string → bytes map
///
/// Implementations must make every call linearizable: a `get` that starts
/// after a `set`/`delete` returns observes it.
pub trait ConcurrentMap: Send + Sync + 'static {
    /// Insert or overwrite the value for `key`
    fn set(&self, key: String, value: Bytes);

    /// Current value for `key`, or `None` if absent
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Remove `key`; absent keys are a no-op
    fn delete(&self, key: &str);

    /// Number of live entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consistent point-in-time copy of every entry
    fn snapshot(&self) -> HashMap<String, Bytes>;

    /// Atomically swap the whole dataset for `entries`
    fn replace(&self, entries: HashMap<String, Bytes>);
}
