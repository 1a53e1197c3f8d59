//! Snapshot Manager
//!
//! Owns the background sync thread and the final flush.
//!
//! ## Lifecycle
//! - `start`: spawn the sync thread (one tick every `sync_interval`)
//! - tick: copy the map under its shared lock, write it out
//! - `shutdown`: stop the thread, then one last synchronous write
//! - `Drop`: runs `shutdown` if nobody did, so the final write happens on
//!   every exit path, unwinding included

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, select, tick, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::Result;
use crate::map::ConcurrentMap;
use super::SnapshotWriter;

/// After this many consecutive periodic failures, failures are logged at
/// error level instead of warn. The engine keeps running either way.
pub const FAILURE_ESCALATION_THRESHOLD: u64 = 5;

/// Point-in-time snapshot counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    /// Successful writes (periodic, forced and final)
    pub snapshots_written: u64,

    /// Failed writes since start
    pub failures: u64,

    /// Failed writes since the last success
    pub consecutive_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    written: AtomicU64,
    failures: AtomicU64,
    consecutive: AtomicU64,

    /// Held for the whole write; the temp file path is shared
    write_lock: Mutex<()>,
}

impl Counters {
    fn record_success(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
        self.consecutive.store(0, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.consecutive.fetch_add(1, Ordering::Relaxed);
    }

    fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            snapshots_written: self.written.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            consecutive_failures: self.consecutive.load(Ordering::Relaxed),
        }
    }
}

/// Handle to the running sync thread
struct SyncTask {
    shutdown_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Persists a [`ConcurrentMap`] to a single snapshot file
///
/// ## Concurrency:
/// - The sync thread and `save` callers only take the map's shared lock
///   (via `ConcurrentMap::snapshot`), and encode/write outside it
/// - Writes (tick, `save`, final flush) are serialized because they share
///   one temp file
pub struct SnapshotManager<M: ConcurrentMap> {
    /// Snapshot file
    path: PathBuf,

    /// The live dataset
    map: Arc<M>,

    counters: Arc<Counters>,

    /// `None` once shut down
    task: Option<SyncTask>,

    closed: bool,
}

impl<M: ConcurrentMap> SnapshotManager<M> {
    /// Start periodic snapshots of `map` to `path`
    ///
    /// The map should already be hydrated; the first write happens one
    /// `interval` after this call.
    pub fn start(path: impl Into<PathBuf>, map: Arc<M>, interval: Duration) -> Result<Self> {
        let path = path.into();
        let counters = Arc::new(Counters::default());
        let (shutdown_tx, shutdown_rx) = bounded(1);

        let handle = {
            let path = path.clone();
            let map = Arc::clone(&map);
            let counters = Arc::clone(&counters);
            thread::Builder::new()
                .name("snapkv-snapshot".to_string())
                .spawn(move || run_sync_loop(&path, &*map, &counters, interval, shutdown_rx))?
        };

        tracing::debug!(
            "Snapshot thread started: file={}, interval={:?}",
            path.display(),
            interval
        );

        Ok(Self {
            path,
            map,
            counters,
            task: Some(SyncTask { shutdown_tx, handle }),
            closed: false,
        })
    }

    /// Write a snapshot now, on the caller's thread
    ///
    /// Returns the number of bytes written.
    pub fn save(&self) -> Result<u64> {
        persist(&self.path, &*self.map, &self.counters)
    }

    /// Stop the sync thread and write the final snapshot
    ///
    /// The final write's error is returned: the caller must know the last
    /// state may not be on disk. Calling this again is a no-op.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Some(task) = self.task.take() {
            // A send error means the thread already exited
            let _ = task.shutdown_tx.send(());
            if task.handle.join().is_err() {
                tracing::error!("Snapshot thread panicked; attempting final snapshot anyway");
            }
        }

        let bytes = self.save()?;
        tracing::info!(
            "Final snapshot written: {} entries, {} bytes to {}",
            self.map.len(),
            bytes,
            self.path.display()
        );
        Ok(())
    }

    /// Snapshot counters
    pub fn stats(&self) -> SnapshotStats {
        self.counters.stats()
    }

    /// The snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `shutdown` has run
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<M: ConcurrentMap> Drop for SnapshotManager<M> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        tracing::debug!("Snapshot manager dropped without shutdown; flushing");
        if let Err(e) = self.shutdown() {
            tracing::error!(
                "Final snapshot to {} failed during drop: {}",
                self.path.display(),
                e
            );
        }
    }
}

// =============================================================================
// Sync Thread
// =============================================================================

fn run_sync_loop<M: ConcurrentMap>(
    path: &Path,
    map: &M,
    counters: &Counters,
    interval: Duration,
    shutdown_rx: Receiver<()>,
) {
    let ticker = tick(interval);

    loop {
        select! {
            recv(ticker) -> _ => {
                if let Err(e) = persist(path, map, counters) {
                    let consecutive = counters.stats().consecutive_failures;
                    if consecutive >= FAILURE_ESCALATION_THRESHOLD {
                        tracing::error!(
                            "Periodic snapshot to {} failed ({} in a row): {}",
                            path.display(),
                            consecutive,
                            e
                        );
                    } else {
                        tracing::warn!(
                            "Periodic snapshot to {} failed, retrying next tick: {}",
                            path.display(),
                            e
                        );
                    }
                }
            }
            // Explicit signal or dropped sender
            recv(shutdown_rx) -> _ => break,
        }
    }

    tracing::debug!("Snapshot thread stopped");
}

/// Copy the map, write it out and record the outcome
fn persist<M: ConcurrentMap>(path: &Path, map: &M, counters: &Counters) -> Result<u64> {
    // Copy under the write lock so files land on disk in copy order
    let _guard = counters.write_lock.lock();
    let entries = map.snapshot();
    match SnapshotWriter::write(path, &entries) {
        Ok(bytes) => {
            counters.record_success();
            tracing::debug!(
                "Snapshot written: {} entries, {} bytes to {}",
                entries.len(),
                bytes,
                path.display()
            );
            Ok(bytes)
        }
        Err(e) => {
            counters.record_failure();
            Err(e)
        }
    }
}
