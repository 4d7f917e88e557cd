//! pulsectl - wallet activity snapshot CLI tool
//!
//! Resolves per-address activity snapshots from Ethereum JSON-RPC data,
//! backed by a short-TTL in-memory cache over a persistent RocksDB store.

use chainpulse::cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr so JSON output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
