//! Request validation
//!
//! Key/value size policy applied before a command reaches the engine.
//! The engine itself accepts anything.

use crate::config::Config;
use crate::error::{Result, SnapError};
use crate::protocol::Command;

/// Size limits for incoming requests (0 = unlimited)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    /// Max key length in characters
    pub max_key_length: usize,

    /// Max value size in bytes
    pub max_value_size: usize,
}

impl RequestLimits {
    pub fn new(max_key_length: usize, max_value_size: usize) -> Self {
        Self {
            max_key_length,
            max_value_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_key_length, config.max_value_size)
    }

    /// Validate a key: non-empty and within `max_key_length` characters
    pub fn check_key(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(SnapError::InvalidKey("key must not be empty".to_string()));
        }
        let len = key.chars().count();
        if self.max_key_length > 0 && len > self.max_key_length {
            return Err(SnapError::KeyTooLong {
                len,
                max: self.max_key_length,
            });
        }
        Ok(())
    }

    /// Validate a value against `max_value_size`
    pub fn check_value(&self, value: &[u8]) -> Result<()> {
        if self.max_value_size > 0 && value.len() > self.max_value_size {
            return Err(SnapError::ValueTooLarge {
                len: value.len(),
                max: self.max_value_size,
            });
        }
        Ok(())
    }

    /// Validate every key/value a command carries
    pub fn check(&self, command: &Command) -> Result<()> {
        if let Some(key) = command.key() {
            self.check_key(key)?;
        }
        if let Command::Set { value, .. } = command {
            self.check_value(value)?;
        }
        Ok(())
    }
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
