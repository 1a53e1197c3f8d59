//! Engine Module
//!
//! The storage engine facade that coordinates the map and its snapshots.
//!
//! ## Responsibilities
//! - Hydrate the map from the last snapshot before serving anything
//! - Serve set/get/delete straight from memory (no I/O on the hot path)
//! - Keep the periodic snapshot thread running
//! - Write the final snapshot on close

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{Result, SnapError};
use crate::map::{ConcurrentMap, LockedMap};
use crate::protocol::Command;
use crate::snapshot::{SnapshotManager, SnapshotReader, SnapshotStats};

/// The main storage engine
///
/// ## Concurrency Model
///
/// - **Reads** (get): shared lock on the map, concurrent with each other
/// - **Writes** (set/delete/seed): exclusive lock for one mutation
/// - **Snapshots**: background thread copies the map under the shared lock
///   every `sync_interval` and writes it out without holding any lock
///
/// The lock strategy is `M`; swap it with [`Engine::open_with_map`].
///
/// ## Lifecycle
///
/// `open` → serve → `close`. If the engine is dropped without `close`
/// (early return, panic), the final snapshot is still attempted and any
/// error is logged instead of returned.
pub struct Engine<M: ConcurrentMap = LockedMap> {
    /// Engine configuration
    config: Config,

    /// The live dataset, shared with the snapshot thread
    map: Arc<M>,

    /// `None` when no data file is configured (in-memory only)
    snapshots: Option<SnapshotManager<M>>,
}

impl Engine<LockedMap> {
    /// Open an engine with the given config
    ///
    /// On startup:
    /// 1. Validate config
    /// 2. Load the snapshot if `data_file` is set and the file exists
    /// 3. Start the periodic snapshot thread
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_map(config, LockedMap::new())
    }

    /// Open with a data file (convenience method)
    ///
    /// Uses default config with the specified snapshot path
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_file(path).build())
    }
}

impl<M: ConcurrentMap> Engine<M> {
    /// Open an engine on top of a caller-supplied (empty) map
    pub fn open_with_map(config: Config, map: M) -> Result<Self> {
        config.validate()?;
        let map = Arc::new(map);

        let snapshots = match &config.data_file {
            Some(path) => {
                // A corrupt or unreadable snapshot is fatal: never start on
                // indeterminate state
                match SnapshotReader::load(path)? {
                    Some(entries) => {
                        tracing::info!(
                            "Loaded snapshot {}: {} entries",
                            path.display(),
                            entries.len()
                        );
                        map.replace(entries);
                    }
                    None => {
                        tracing::info!("No snapshot at {}, starting empty", path.display());
                    }
                }

                Some(SnapshotManager::start(
                    path.clone(),
                    Arc::clone(&map),
                    config.sync_interval,
                )?)
            }
            None => {
                tracing::info!("No data file configured, running in-memory only");
                None
            }
        };

        Ok(Self {
            config,
            map,
            snapshots,
        })
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Option<Bytes>> {
        match command {
            Command::Get { key } => self.get(&key),
            Command::Set { key, value } => {
                self.set(key, value)?;
                Ok(None)
            }
            Command::Delete { key } => {
                self.delete(&key)?;
                Ok(None)
            }
            Command::Ping => Ok(Some(Bytes::from_static(b"PONG"))),
        }
    }

    /// Set a key to a value (insert or overwrite)
    pub fn set(&self, key: impl Into<String>, value: impl Into<Bytes>) -> Result<()> {
        self.map.set(key.into(), value.into());
        Ok(())
    }

    /// Get a value by key
    ///
    /// `Ok(None)` means the key is absent; a missing key is not an error.
    pub fn get(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.map.get(key))
    }

    /// Delete a key (absent keys succeed)
    pub fn delete(&self, key: &str) -> Result<()> {
        self.map.delete(key);
        Ok(())
    }

    /// Replace the whole dataset in one step, bypassing persistence
    ///
    /// Meant for benchmarks and tests. The next snapshot (periodic or final)
    /// will persist the seeded data like any other.
    pub fn seed(&self, entries: HashMap<String, Bytes>) {
        self.map.replace(entries);
    }

    /// Write a snapshot now instead of waiting for the next tick
    pub fn sync(&self) -> Result<()> {
        let snapshots = self
            .snapshots
            .as_ref()
            .ok_or(SnapError::PersistenceDisabled)?;
        snapshots.save()?;
        Ok(())
    }

    /// Close the engine gracefully
    ///
    /// Stops the snapshot thread and writes one final snapshot. An error
    /// means the latest state may not be on disk.
    pub fn close(self) -> Result<()> {
        match self.snapshots {
            Some(mut snapshots) => snapshots.shutdown(),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Get the snapshot file path, if persistence is enabled
    pub fn data_file(&self) -> Option<&Path> {
        self.config.data_file.as_deref()
    }

    /// Snapshot counters, if persistence is enabled
    pub fn snapshot_stats(&self) -> Option<SnapshotStats> {
        self.snapshots.as_ref().map(|s| s.stats())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
