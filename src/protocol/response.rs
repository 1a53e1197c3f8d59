//! Response definitions
//!
//! Represents responses to clients.

use bytes::Bytes;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
    Invalid = 0x03,
}

impl Status {
    /// Parse a status byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::NotFound),
            0x02 => Some(Status::Error),
            0x03 => Some(Status::Invalid),
            _ => None,
        }
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value for GET, message for ERROR/INVALID)
    pub payload: Option<Bytes>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Bytes>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(Bytes::copy_from_slice(message.as_bytes())),
        }
    }

    /// Create an INVALID response (request failed validation)
    pub fn invalid(message: &str) -> Self {
        Self {
            status: Status::Invalid,
            payload: Some(Bytes::copy_from_slice(message.as_bytes())),
        }
    }

    /// Payload interpreted as a UTF-8 message (lossy)
    pub fn message(&self) -> String {
        self.payload
            .as_ref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }
}
