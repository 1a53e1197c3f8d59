//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::io::ErrorKind;
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::{write_response, Response};

use super::{Connection, RequestLimits};

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for SnapKV
///
/// `run`/`serve` take `&self`, so the server can live in an `Arc` while
/// another thread calls [`Server::shutdown`].
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    limits: RequestLimits,
    shutdown: Arc<AtomicBool>,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        let limits = RequestLimits::from_config(&config);
        Self {
            config,
            engine,
            limits,
            shutdown: Arc::new(AtomicBool::new(false)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind the configured listen address
    pub fn bind(&self) -> Result<TcpListener> {
        let listener = TcpListener::bind(&self.config.listen_addr)?;
        tracing::info!("Listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Bind and serve until shutdown (blocking)
    pub fn run(&self) -> Result<()> {
        let listener = self.bind()?;
        self.serve(listener)
    }

    /// Serve connections from `listener` until shutdown (blocking)
    ///
    /// On shutdown, connections close after their in-flight request. Any
    /// still open after `shutdown_timeout_ms` are force-closed, so no
    /// request runs after return.
    pub fn serve(&self, listener: TcpListener) -> Result<()> {
        listener.set_nonblocking(true)?;
        let mut workers: Vec<Worker> = Vec::new();

        while !self.shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    tracing::trace!("Accepted connection from {}", addr);
                    if let Some(worker) = self.dispatch(stream) {
                        workers.push(worker);
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    workers.retain(|w| !w.handle.is_finished());
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        drop(listener);
        self.drain(workers);
        Ok(())
    }

    /// Wait for connection threads, force-closing stragglers at the deadline
    fn drain(&self, workers: Vec<Worker>) {
        tracing::info!(
            "Shutting down, waiting up to {}ms for {} connection(s)",
            self.config.shutdown_timeout_ms,
            self.active_connections.load(Ordering::SeqCst)
        );

        let deadline = Instant::now() + Duration::from_millis(self.config.shutdown_timeout_ms);
        while Instant::now() < deadline && workers.iter().any(|w| !w.handle.is_finished()) {
            thread::sleep(ACCEPT_POLL_INTERVAL);
        }

        let mut forced = 0;
        for worker in workers.iter().filter(|w| !w.handle.is_finished()) {
            // Unblocks the handler's read; it sees EOF and returns
            if let Err(e) = worker.control.shutdown(Shutdown::Both) {
                tracing::debug!("Force-close failed: {}", e);
            }
            forced += 1;
        }
        if forced > 0 {
            tracing::warn!("Shutdown timeout expired, force-closed {} connection(s)", forced);
        }

        for worker in workers {
            if worker.handle.join().is_err() {
                tracing::error!("Connection thread panicked");
            }
        }
    }

    /// Spawn a handler thread for `stream`, or turn it away when full
    fn dispatch(&self, stream: TcpStream) -> Option<Worker> {
        if self.active_connections.load(Ordering::SeqCst) >= self.config.max_connections {
            tracing::warn!(
                "Rejecting connection: {} connections already open",
                self.config.max_connections
            );
            reject(stream);
            return None;
        }

        // Accepted sockets inherit non-blocking mode on some platforms
        let control = match stream
            .set_nonblocking(false)
            .and_then(|()| stream.try_clone())
        {
            Ok(control) => control,
            Err(e) => {
                tracing::warn!("Failed to configure connection: {}", e);
                return None;
            }
        };

        let engine = Arc::clone(&self.engine);
        let limits = self.limits;
        let shutdown = Arc::clone(&self.shutdown);
        let active = Arc::clone(&self.active_connections);
        let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

        active.fetch_add(1, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name("snapkv-conn".to_string())
            .spawn(move || {
                let _guard = ConnectionGuard(active);
                let result = Connection::new(stream, engine, limits, shutdown)
                    .and_then(|mut conn| {
                        conn.set_timeouts(read_ms, write_ms)?;
                        conn.handle()
                    });
                if let Err(e) = result {
                    tracing::debug!("Connection ended with error: {}", e);
                }
            });

        match spawned {
            Ok(handle) => Some(Worker { handle, control }),
            Err(e) => {
                // The closure (and its guard) never ran
                self.active_connections.fetch_sub(1, Ordering::SeqCst);
                tracing::error!("Failed to spawn connection thread: {}", e);
                None
            }
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Flag that stops the accept loop when set (for signal handlers)
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}

/// A running connection thread and a handle to force-close its socket
struct Worker {
    handle: JoinHandle<()>,
    control: TcpStream,
}

/// Decrements the active connection count when the handler exits
struct ConnectionGuard(Arc<AtomicUsize>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn reject(mut stream: TcpStream) {
    let _ = stream.set_nonblocking(false);
    let _ = write_response(&mut stream, &Response::error("too many connections"));
}
