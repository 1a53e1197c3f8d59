//! Network Module
//!
//! TCP server, client and request validation.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polls a shutdown flag)
//! - One thread per connection, capped at `max_connections`
//! - Requests validated against [`RequestLimits`], then routed through Engine

mod server;
mod connection;
mod client;
mod limits;

pub use server::Server;
pub use connection::Connection;
pub use client::Client;
pub use limits::RequestLimits;
