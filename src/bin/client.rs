//! FileDrop Client Binary
//!
//! Interactive prompt for issuing commands to a FileDrop server.

use std::io;

use clap::Parser;
use filedrop::transfer::DEFAULT_CHUNK_SIZE;
use filedrop::{Client, ClientConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// FileDrop Client
#[derive(Parser, Debug)]
#[command(name = "filedrop-client")]
#[command(about = "Interactive client for a FileDrop server")]
#[command(version)]
struct Args {
    /// Server host
    host: String,

    /// Server port
    port: u16,

    /// Directory downloads are written into
    #[arg(short, long, default_value = "./client_downloads")]
    download_dir: String,

    /// Transfer chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

fn main() {
    // Logs go to stderr so they never mix with command output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = ClientConfig::builder()
        .server_addr(format!("{}:{}", args.host, args.port))
        .download_dir(&args.download_dir)
        .chunk_size(args.chunk_size)
        .build();

    if let Err(e) = std::fs::create_dir_all(&config.download_dir) {
        tracing::error!("Cannot create download directory {}: {}", args.download_dir, e);
        std::process::exit(1);
    }

    let client = Client::new(config);
    let stdin = io::stdin();

    if let Err(e) = client.run(stdin.lock(), io::stdout()) {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
