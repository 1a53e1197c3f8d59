//! Command definitions
//!
//! Represents commands from clients.

use bytes::Bytes;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = 0x01,
    Set = 0x02,
    Delete = 0x03,
    Ping = 0x04,
}

impl CommandType {
    /// Parse a command byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(CommandType::Get),
            0x02 => Some(CommandType::Set),
            0x03 => Some(CommandType::Delete),
            0x04 => Some(CommandType::Ping),
            _ => None,
        }
    }

    /// Name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            CommandType::Get => "GET",
            CommandType::Set => "SET",
            CommandType::Delete => "DEL",
            CommandType::Ping => "PING",
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Get a value by key
    Get { key: String },

    /// Set a key to a value
    Set { key: String, value: Bytes },

    /// Delete a key
    Delete { key: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
        }
    }

    /// The key this command addresses, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Command::Get { key } | Command::Set { key, .. } | Command::Delete { key } => Some(key),
            Command::Ping => None,
        }
    }
}
