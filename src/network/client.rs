//! Blocking TCP client
//!
//! Used by the CLI binary and the server tests.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Result, SnapError};
use crate::protocol::{read_response, write_command, Command, Response, Status};

/// A single connection to a SnapKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to `addr`
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| SnapError::Network(format!("connect failed: {}", e)))?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Apply a read/write timeout to the socket
    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        Ok(())
    }

    /// Send a command and wait for its response
    pub fn request(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// Get a value; `Ok(None)` if the key does not exist
    pub fn get(&mut self, key: &str) -> Result<Option<Bytes>> {
        let response = self.request(&Command::Get {
            key: key.to_string(),
        })?;
        match response.status {
            Status::Ok => Ok(Some(response.payload.unwrap_or_default())),
            Status::NotFound => Ok(None),
            _ => Err(into_error(response)),
        }
    }

    /// Set a key to a value
    pub fn set(&mut self, key: &str, value: impl Into<Bytes>) -> Result<()> {
        let response = self.request(&Command::Set {
            key: key.to_string(),
            value: value.into(),
        })?;
        expect_ok(response)
    }

    /// Delete a key
    pub fn delete(&mut self, key: &str) -> Result<()> {
        let response = self.request(&Command::Delete {
            key: key.to_string(),
        })?;
        expect_ok(response)
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        expect_ok(self.request(&Command::Ping)?)
    }
}

fn expect_ok(response: Response) -> Result<()> {
    match response.status {
        Status::Ok => Ok(()),
        _ => Err(into_error(response)),
    }
}

fn into_error(response: Response) -> SnapError {
    match response.status {
        Status::Invalid => SnapError::Rejected(response.message()),
        Status::NotFound => SnapError::Protocol("unexpected NOT_FOUND response".to_string()),
        _ => SnapError::Network(format!("server error: {}", response.message())),
    }
}
