//! Configuration for SnapKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, SnapError};

/// Default maximum key length (characters)
pub const DEFAULT_MAX_KEY_LENGTH: usize = 256;

/// Default maximum value size (bytes)
pub const DEFAULT_MAX_VALUE_SIZE: usize = 1024 * 1024;

/// Main configuration for a SnapKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// Snapshot file. `None` keeps the store purely in memory.
    /// While a snapshot is being written a sibling `{data_file}.tmp` exists.
    pub data_file: Option<PathBuf>,

    /// Interval between automatic snapshots
    pub sync_interval: Duration,

    // -------------------------------------------------------------------------
    // Request Limits (enforced by the network layer, 0 = unlimited)
    // -------------------------------------------------------------------------
    /// Max key length in characters
    pub max_key_length: usize,

    /// Max value size in bytes
    pub max_value_size: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,

    /// How long shutdown waits for open connections before force-closing
    /// them (milliseconds)
    pub shutdown_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            sync_interval: Duration::from_secs(60),
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            listen_addr: "127.0.0.1:8000".to_string(),
            max_connections: 1024,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            shutdown_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config for values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.data_file.is_some() && self.sync_interval.is_zero() {
            return Err(SnapError::Config(
                "sync_interval must be greater than zero when a data file is set".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(SnapError::Config(
                "max_connections must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot file (enables persistence)
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_file = Some(path.into());
        self
    }

    /// Set the interval between automatic snapshots
    pub fn sync_interval(mut self, interval: Duration) -> Self {
        self.config.sync_interval = interval;
        self
    }

    /// Set the maximum key length (0 = unlimited)
    pub fn max_key_length(mut self, len: usize) -> Self {
        self.config.max_key_length = len;
        self
    }

    /// Set the maximum value size in bytes (0 = unlimited)
    pub fn max_value_size(mut self, size: usize) -> Self {
        self.config.max_value_size = size;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the graceful shutdown timeout (in milliseconds)
    pub fn shutdown_timeout_ms(mut self, ms: u64) -> Self {
        self.config.shutdown_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
