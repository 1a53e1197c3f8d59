//! Snapshot Reader
//!
//! Loads the dataset from the snapshot file at startup.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use bytes::Bytes;

use crate::error::Result;
use super::{decode_snapshot, SnapshotWriter};

/// Reads snapshots from disk
pub struct SnapshotReader;

impl SnapshotReader {
    /// Load the dataset stored at `path`
    ///
    /// Returns:
    /// - `Ok(None)`: no snapshot file exists (fresh store)
    /// - `Ok(Some(entries))`: snapshot decoded
    /// - `Err(_)`: file exists but cannot be read or is corrupt
    ///
    /// A leftover `{path}.tmp` from an interrupted write is removed; it was
    /// never renamed into place, so the snapshot at `path` is authoritative.
    pub fn load(path: &Path) -> Result<Option<HashMap<String, Bytes>>> {
        Self::discard_stale_temp(path);

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        decode_snapshot(&bytes).map(Some)
    }

    fn discard_stale_temp(path: &Path) {
        let tmp = SnapshotWriter::temp_path(path);
        if tmp.is_file() {
            tracing::warn!("Removing stale snapshot temp file {}", tmp.display());
            if let Err(e) = fs::remove_file(&tmp) {
                tracing::warn!("Failed to remove {}: {}", tmp.display(), e);
            }
        }
    }
}
