//! SnapKV Server Binary
//!
//! Starts the TCP server for SnapKV.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use snapkv::network::Server;
use snapkv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// SnapKV Server
#[derive(Parser, Debug)]
#[command(name = "snapkv-server")]
#[command(about = "In-memory key-value store with periodic snapshots")]
#[command(version)]
struct Args {
    /// Snapshot file (omit to run in-memory only)
    #[arg(short, long, env = "DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Time between automatic snapshots (e.g. 30s, 1m, 1h)
    #[arg(short, long, env = "SYNC_INTERVAL", default_value = "1m", value_parser = humantime::parse_duration)]
    sync_interval: Duration,

    /// Listen address (host:port)
    #[arg(short, long, env = "SERVER_ADDRESS", default_value = "127.0.0.1:8000")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Maximum key length in characters (0 = unlimited)
    #[arg(long, env = "MAX_KEY_LENGTH", default_value_t = snapkv::config::DEFAULT_MAX_KEY_LENGTH)]
    max_key_length: usize,

    /// Maximum value size in bytes (0 = unlimited)
    #[arg(long, env = "MAX_VALUE_SIZE", default_value_t = snapkv::config::DEFAULT_MAX_VALUE_SIZE)]
    max_value_size: usize,

    /// Idle time before a connection is closed (0s = never)
    #[arg(long, env = "SERVER_READ_TIMEOUT", default_value = "5s", value_parser = humantime::parse_duration)]
    read_timeout: Duration,

    /// Time allowed to write one response (0s = no limit)
    #[arg(long, env = "SERVER_WRITE_TIMEOUT", default_value = "5s", value_parser = humantime::parse_duration)]
    write_timeout: Duration,

    /// How long shutdown waits for open connections before closing them
    #[arg(long, env = "SERVER_SHUTDOWN_TIMEOUT", default_value = "5s", value_parser = humantime::parse_duration)]
    shutdown_timeout: Duration,
}

impl Args {
    fn config(&self) -> Config {
        let mut builder = Config::builder()
            .sync_interval(self.sync_interval)
            .listen_addr(&self.listen)
            .max_connections(self.max_connections)
            .max_key_length(self.max_key_length)
            .max_value_size(self.max_value_size)
            .read_timeout_ms(millis(self.read_timeout))
            .write_timeout_ms(millis(self.write_timeout))
            .shutdown_timeout_ms(millis(self.shutdown_timeout));
        if let Some(path) = &self.data_file {
            builder = builder.data_file(path);
        }
        builder.build()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,snapkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("SnapKV Server v{}", snapkv::VERSION);
    match &args.data_file {
        Some(path) => tracing::info!("Data file: {}", path.display()),
        None => tracing::info!("Data file: none (in-memory only)"),
    }
    tracing::info!("Listen address: {}", args.listen);

    let config = args.config();
    tracing::info!(
        "Sync interval: {}",
        humantime::format_duration(config.sync_interval)
    );

    // Open engine (loads the snapshot)
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Engine initialized with {} keys", engine.len());

    let server = Server::new(config, Arc::clone(&engine));

    // Ctrl+C / SIGTERM stops the accept loop
    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received shutdown signal, initiating shutdown...");
        shutdown.store(true, Ordering::Relaxed);
    }) {
        tracing::error!("Failed to install signal handler: {}", e);
        return ExitCode::FAILURE;
    }

    let served = server.run();
    drop(server);

    if let Err(e) = &served {
        tracing::error!("Server error: {}", e);
    }

    // All connection threads are joined, so the server's clone is gone
    let closed = match Arc::try_unwrap(engine) {
        Ok(engine) => engine.close(),
        Err(_) => {
            // Dropping the last reference still writes the final snapshot
            tracing::warn!("Engine still shared at shutdown; final snapshot deferred to drop");
            Ok(())
        }
    };

    match (served, closed) {
        (Ok(()), Ok(())) => {
            tracing::info!("Server stopped");
            ExitCode::SUCCESS
        }
        (_, Err(e)) => {
            tracing::error!("Final snapshot failed, recent writes may be lost: {}", e);
            ExitCode::FAILURE
        }
        (Err(_), Ok(())) => ExitCode::FAILURE,
    }
}
