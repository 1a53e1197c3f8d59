//! Error types for SnapKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SnapError
pub type Result<T> = std::result::Result<T, SnapError>;

/// Unified error type for SnapKV operations
#[derive(Debug, Error)]
pub enum SnapError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot corruption detected: {0}")]
    SnapshotCorruption(String),

    #[error("Persistence is disabled (no data file configured)")]
    PersistenceDisabled,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Request Validation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Key length {len} exceeds maximum allowed length {max}")]
    KeyTooLong { len: usize, max: usize },

    #[error("Value size {len} exceeds maximum allowed size {max}")]
    ValueTooLarge { len: usize, max: usize },

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Request rejected by server: {0}")]
    Rejected(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for SnapError {
    fn from(e: bincode::Error) -> Self {
        SnapError::Serialization(e.to_string())
    }
}

impl SnapError {
    /// True for errors caused by a malformed client request rather than the server
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            SnapError::InvalidKey(_) | SnapError::KeyTooLong { .. } | SnapError::ValueTooLarge { .. }
        )
    }
}
