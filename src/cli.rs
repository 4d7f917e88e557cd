//! CLI implementation for pulsectl
//!
//! Provides a developer-friendly command-line interface over the snapshot
//! pipeline. All commands output pretty JSON.

use crate::batch::BatchCoordinator;
use crate::cache::SnapshotCache;
use crate::config::{load_address_list, Config};
use crate::rpc::RpcClient;
use crate::service::{parse_address, SnapshotService};
use crate::store::{RocksSnapshotStore, SnapshotStore};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Wallet activity snapshot CLI tool
#[derive(Parser)]
#[command(name = "pulsectl")]
#[command(about = "Wallet activity snapshot CLI tool")]
pub struct Cli {
    /// Ethereum JSON-RPC endpoint URL
    #[arg(long, env = "CHAINPULSE_RPC_URL", default_value = "http://127.0.0.1:8545")]
    rpc_url: String,

    /// Path to the RocksDB database directory
    #[arg(short, long, env = "CHAINPULSE_DB_PATH", default_value = "./pulse_db")]
    db_path: PathBuf,

    /// Ephemeral cache TTL in seconds
    #[arg(long, env = "CHAINPULSE_CACHE_TTL_SECS", default_value_t = 300)]
    cache_ttl: u64,

    /// History lookback window in days
    #[arg(long, env = "CHAINPULSE_LOOKBACK_DAYS", default_value_t = 30)]
    lookback_days: u64,

    /// Approximate blocks mined per day on the target chain
    #[arg(long, env = "CHAINPULSE_BLOCKS_PER_DAY", default_value_t = 86_400)]
    blocks_per_day: u64,

    /// Maximum valid addresses per batch
    #[arg(long, env = "CHAINPULSE_BATCH_LIMIT", default_value_t = 10)]
    batch_limit: usize,

    /// Maximum concurrent resolutions within a batch
    #[arg(long, env = "CHAINPULSE_MAX_CONCURRENCY", default_value_t = 10)]
    max_concurrency: usize,

    /// Per-call RPC timeout in seconds
    #[arg(long, env = "CHAINPULSE_RPC_TIMEOUT_SECS", default_value_t = 30)]
    rpc_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the activity snapshot for one address
    Wallet {
        /// Account address (hex, with or without 0x prefix)
        address: String,
    },
    /// Resolve snapshots for several addresses
    Batch {
        /// Account addresses (hex, with or without 0x prefix)
        addresses: Vec<String>,

        /// File with one address per line ('#' starts a comment)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print the stored snapshot for an address without touching the chain
    Show {
        /// Account address (hex, with or without 0x prefix)
        address: String,
    },
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            cache_ttl_secs: self.cache_ttl,
            lookback_days: self.lookback_days,
            blocks_per_day: self.blocks_per_day,
            batch_limit: self.batch_limit,
            max_concurrency: self.max_concurrency,
            rpc_timeout_secs: self.rpc_timeout,
        }
    }
}

/// Build the full resolution stack: RPC client, RocksDB store, cache.
fn build_service(
    rpc_url: &str,
    db_path: &Path,
    config: &Config,
) -> Result<SnapshotService<RpcClient, RocksSnapshotStore>> {
    let rpc = RpcClient::new(
        rpc_url.to_string(),
        Duration::from_secs(config.rpc_timeout_secs),
    )?;
    let store = RocksSnapshotStore::open(db_path)
        .with_context(|| format!("Failed to open database at {:?}", db_path))?;
    let cache = SnapshotCache::new(store, Duration::from_secs(config.cache_ttl_secs));
    Ok(SnapshotService::new(rpc, cache, config.clone()))
}

/// Run the CLI command and print JSON output.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    let result = match cli.command {
        Commands::Wallet { address } => {
            let service = build_service(&cli.rpc_url, &cli.db_path, &config)?;
            let snapshot = service.resolve(&address).await?;
            serde_json::to_value(&snapshot)?
        }
        Commands::Batch { mut addresses, file } => {
            if let Some(path) = file {
                addresses.extend(load_address_list(&path)?);
            }
            let service = build_service(&cli.rpc_url, &cli.db_path, &config)?;
            let coordinator = BatchCoordinator::new(service, &config);
            let results = coordinator.resolve_many(&addresses).await?;
            serde_json::to_value(&results)?
        }
        Commands::Show { address } => {
            let addr = parse_address(&address)?;
            let store = RocksSnapshotStore::open(&cli.db_path)
                .with_context(|| format!("Failed to open database at {:?}", cli.db_path))?;
            match store.find(addr)? {
                Some(snapshot) => json!({
                    "address": format!("0x{:x}", addr),
                    "snapshot": serde_json::to_value(&snapshot)?,
                }),
                None => json!({
                    "address": format!("0x{:x}", addr),
                    "snapshot": null,
                }),
            }
        }
    };

    // Pretty print JSON
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
