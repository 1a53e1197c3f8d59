//! Snapshot encoding
//!
//! Turns the full key → value mapping into a checksummed blob and back.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::{Result, SnapError};

/// Size of the CRC32 footer
pub const CHECKSUM_SIZE: usize = 4;

/// Encode the dataset: bincode body followed by its CRC32
pub fn encode_snapshot(entries: &HashMap<String, Bytes>) -> Result<Vec<u8>> {
    let mut buf = bincode::serialize(entries)?;
    let crc = crc32fast::hash(&buf);
    buf.extend_from_slice(&crc.to_be_bytes());
    Ok(buf)
}

/// Decode a blob produced by [`encode_snapshot`]
///
/// Any truncation, checksum mismatch or undecodable body is reported as
/// [`SnapError::SnapshotCorruption`].
pub fn decode_snapshot(bytes: &[u8]) -> Result<HashMap<String, Bytes>> {
    if bytes.len() < CHECKSUM_SIZE {
        return Err(SnapError::SnapshotCorruption(format!(
            "file too short: {} bytes (need at least {})",
            bytes.len(),
            CHECKSUM_SIZE
        )));
    }

    let (body, footer) = bytes.split_at(bytes.len() - CHECKSUM_SIZE);
    let stored = u32::from_be_bytes([footer[0], footer[1], footer[2], footer[3]]);
    let computed = crc32fast::hash(body);

    if stored != computed {
        return Err(SnapError::SnapshotCorruption(format!(
            "checksum mismatch: stored 0x{:08x}, computed 0x{:08x}",
            stored, computed
        )));
    }

    bincode::deserialize(body)
        .map_err(|e| SnapError::SnapshotCorruption(format!("undecodable body: {}", e)))
}
