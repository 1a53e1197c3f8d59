//! Snapshot Module
//!
//! Provides durability through periodic whole-dataset snapshots.
//!
//! ## Responsibilities
//! - Hydrate the map from the last snapshot on startup
//! - Rewrite the full dataset on a fixed interval
//! - One final synchronous write on shutdown
//! - CRC32 checksum for corruption detection
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────┬───────────┐
//! │ bincode(HashMap<String, Bytes>)          │ CRC32 (4) │
//! └──────────────────────────────────────────┴───────────┘
//! ```
//!
//! The CRC covers the bincode body and is stored big-endian. A file is only
//! ever replaced whole: the writer fills `{data_file}.tmp`, fsyncs it and
//! renames it over the data file.

mod format;
mod writer;
mod reader;
mod manager;

pub use format::{encode_snapshot, decode_snapshot, CHECKSUM_SIZE};
pub use writer::SnapshotWriter;
pub use reader::SnapshotReader;
pub use manager::{SnapshotManager, SnapshotStats, FAILURE_ESCALATION_THRESHOLD};
