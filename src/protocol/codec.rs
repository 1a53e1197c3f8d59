//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! Every frame is a 1-byte tag (command type or status), a 4-byte
//! big-endian payload length, then the payload.
//!
//! ### Payload by Command Type
//! - GET:    key_len (4 bytes) + key
//! - SET:    key_len (4 bytes) + key + value
//! - DEL:    key_len (4 bytes) + key
//! - PING:   empty

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, SnapError};
use super::{Command, CommandType, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
pub fn encode_command(command: &Command) -> Bytes {
    let mut payload = BytesMut::new();
    match command {
        Command::Get { key } | Command::Delete { key } => put_key(&mut payload, key),
        Command::Set { key, value } => {
            put_key(&mut payload, key);
            payload.put_slice(value);
        }
        Command::Ping => {}
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from a complete frame
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (tag, payload) = split_frame(bytes, "request")?;
    decode_command_payload(tag, payload)
}

fn decode_command_payload(tag: u8, payload: &[u8]) -> Result<Command> {
    let cmd_type = CommandType::from_u8(tag).ok_or_else(|| {
        SnapError::Protocol(format!("Unknown command type: 0x{:02x}", tag))
    })?;

    match cmd_type {
        CommandType::Get => {
            let (key, _) = decode_key(cmd_type, payload)?;
            Ok(Command::Get { key })
        }
        CommandType::Set => {
            let (key, value) = decode_key(cmd_type, payload)?;
            Ok(Command::Set {
                key,
                value: Bytes::copy_from_slice(value),
            })
        }
        CommandType::Delete => {
            let (key, _) = decode_key(cmd_type, payload)?;
            Ok(Command::Delete { key })
        }
        CommandType::Ping => {
            if !payload.is_empty() {
                return Err(SnapError::Protocol(format!(
                    "PING command: unexpected payload of {} bytes",
                    payload.len()
                )));
            }
            Ok(Command::Ping)
        }
    }
}

fn put_key(buf: &mut BytesMut, key: &str) {
    buf.put_u32(key.len() as u32);
    buf.put_slice(key.as_bytes());
}

/// Split a payload into its UTF-8 key and the remaining bytes
fn decode_key(cmd_type: CommandType, payload: &[u8]) -> Result<(String, &[u8])> {
    let mut buf = payload;
    if buf.remaining() < 4 {
        return Err(SnapError::Protocol(format!(
            "{} command: missing key length",
            cmd_type.name()
        )));
    }

    let key_len = buf.get_u32() as usize;
    if buf.remaining() < key_len {
        return Err(SnapError::Protocol(format!(
            "{} command: incomplete key (expected {}, got {})",
            cmd_type.name(),
            key_len,
            buf.remaining()
        )));
    }

    let (key, rest) = buf.split_at(key_len);
    let key = String::from_utf8(key.to_vec()).map_err(|_| {
        SnapError::Protocol(format!("{} command: key is not valid UTF-8", cmd_type.name()))
    })?;

    Ok((key, rest))
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Bytes {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from a complete frame
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (tag, payload) = split_frame(bytes, "response")?;
    decode_response_payload(tag, payload)
}

fn decode_response_payload(tag: u8, payload: &[u8]) -> Result<Response> {
    let status = Status::from_u8(tag).ok_or_else(|| {
        SnapError::Protocol(format!("Unknown response status: 0x{:02x}", tag))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(Bytes::copy_from_slice(payload))
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(tag: u8, payload: &[u8]) -> Bytes {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(tag);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.freeze()
}

fn check_payload_len(len: usize, what: &str) -> Result<()> {
    if len > MAX_PAYLOAD_SIZE as usize {
        return Err(SnapError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

/// Split a complete frame into (tag, payload)
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(SnapError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let tag = header.get_u8();
    let payload_len = header.get_u32() as usize;
    check_payload_len(payload_len, what)?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(SnapError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

/// Read one frame from a stream
///
/// Blocks until a complete frame is received or an error occurs
fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<(u8, Vec<u8>)> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut buf = &header[..];
    let tag = buf.get_u8();
    let payload_len = buf.get_u32() as usize;
    check_payload_len(payload_len, what)?;

    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    Ok((tag, payload))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let (tag, payload) = read_frame(reader, "request")?;
    decode_command_payload(tag, &payload)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let (tag, payload) = read_frame(reader, "response")?;
    decode_response_payload(tag, &payload)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}
