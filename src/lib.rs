//! # SnapKV
//!
//! An in-memory key-value store with:
//! - Concurrent map behind a pluggable lock strategy
//! - Periodic whole-dataset snapshots (atomic temp file + rename)
//! - Final snapshot on close, or on drop if close was skipped
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │         (Multiple Clients, request size limits)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Engine facade                             │
//! │                 set / get / delete                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────┐
//!   │     Map     │◀─────────│   Snapshot   │
//!   │  (RwLock)   │  copy    │   Manager    │──▶ data file
//!   └─────────────┘  every   └──────────────┘
//!                    tick
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod map;
pub mod snapshot;
pub mod network;
pub mod protocol;
pub mod engine;
pub mod seed;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SnapError, Result};
pub use config::Config;
pub use engine::Engine;
pub use map::{ConcurrentMap, LockedMap};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SnapKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
