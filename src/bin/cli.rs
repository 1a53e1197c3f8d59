//! SnapKV CLI Client
//!
//! Command-line interface for interacting with SnapKV.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use snapkv::network::Client;
use snapkv::seed::{generate_entries, DEFAULT_SEED_KEYS};
use snapkv::snapshot::SnapshotWriter;

/// SnapKV CLI
#[derive(Parser, Debug)]
#[command(name = "snapkv-cli")]
#[command(about = "CLI for SnapKV key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, env = "SERVER_ADDRESS", default_value = "127.0.0.1:8000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Ping the server
    Ping,

    /// Write a snapshot file of generated seed data (no server needed)
    Seed {
        /// Snapshot file to create
        #[arg(short, long)]
        out: PathBuf,

        /// Number of keys to generate
        #[arg(short, long, default_value_t = DEFAULT_SEED_KEYS)]
        count: usize,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> snapkv::Result<()> {
    if let Commands::Seed { out, count } = &args.command {
        let bytes = SnapshotWriter::write(out, &generate_entries(*count))?;
        println!("wrote {} keys ({} bytes) to {}", count, bytes, out.display());
        return Ok(());
    }

    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::Get { key } => match client.get(&key)? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => println!("(nil)"),
        },
        Commands::Set { key, value } => {
            client.set(&key, value.into_bytes())?;
            println!("OK");
        }
        Commands::Del { key } => {
            client.delete(&key)?;
            println!("OK");
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
        Commands::Seed { .. } => {}
    }

    Ok(())
}
