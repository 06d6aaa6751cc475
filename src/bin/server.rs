//! FileDrop Server Binary
//!
//! Serves a storage root over TCP.

use clap::Parser;
use filedrop::network::Server;
use filedrop::transfer::DEFAULT_CHUNK_SIZE;
use filedrop::Config;
use tracing_subscriber::{fmt, EnvFilter};

/// FileDrop Server
#[derive(Parser, Debug)]
#[command(name = "filedrop-server")]
#[command(about = "Minimal remote file-storage server")]
#[command(version)]
struct Args {
    /// Directory whose files are served
    #[arg(short, long, default_value = "./server_files")]
    root: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Socket read timeout in milliseconds (0 disables)
    #[arg(long, default_value = "30000")]
    read_timeout_ms: u64,

    /// Transfer chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,filedrop=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .init();

    let args = Args::parse();

    tracing::info!("FileDrop Server v{}", filedrop::VERSION);
    tracing::info!("Storage root: {}", args.root);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .storage_root(&args.root)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.read_timeout_ms)
        .chunk_size(args.chunk_size)
        .build();

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
