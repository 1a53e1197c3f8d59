//! Snapshot Writer
//!
//! Replaces the snapshot file atomically (temp file + rename).

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::Result;
use super::encode_snapshot;

/// Writes full snapshots to disk
pub struct SnapshotWriter;

impl SnapshotWriter {
    /// Write `entries` to `path`, replacing any previous snapshot
    ///
    /// Steps:
    /// 1. Encode the dataset
    /// 2. Write and fsync `{path}.tmp`
    /// 3. Rename it over `path`
    /// 4. fsync the parent directory (unix)
    ///
    /// Readers see either the old file or the new one, never a partial write.
    /// Returns the number of bytes written.
    pub fn write(path: &Path, entries: &HashMap<String, Bytes>) -> Result<u64> {
        let bytes = encode_snapshot(entries)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = Self::temp_path(path);
        if let Err(e) = Self::write_and_rename(&tmp, path, &bytes) {
            // Leave no stale temp file behind; the old snapshot is untouched
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        Ok(bytes.len() as u64)
    }

    /// Path of the temporary file used while writing `path`
    pub fn temp_path(path: &Path) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn write_and_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = File::create(tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(tmp, path)?;
        Self::sync_parent_dir(path);
        Ok(())
    }

    /// Persist the rename itself. Best-effort: the data is already on disk.
    #[cfg(unix)]
    fn sync_parent_dir(path: &Path) {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
            tracing::debug!("Could not fsync directory {}: {}", dir.display(), e);
        }
    }

    #[cfg(not(unix))]
    fn sync_parent_dir(_path: &Path) {}
}
