//! Configuration and address list loading
//!
//! Holds the tunable parameters for snapshot resolution and loads batch
//! address lists from files.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Tunable parameters for snapshot resolution and batch fan-out.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ephemeral cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// History lookback window in days
    pub lookback_days: u64,
    /// Approximate blocks mined per day on the target chain
    pub blocks_per_day: u64,
    /// Maximum valid addresses accepted per batch
    pub batch_limit: usize,
    /// Maximum concurrently executing resolutions within a batch
    pub max_concurrency: usize,
    /// Per-call RPC timeout in seconds
    pub rpc_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            lookback_days: 30,
            blocks_per_day: 86_400,
            batch_limit: 10,
            max_concurrency: 10,
            rpc_timeout_secs: 30,
        }
    }
}

/// Load an address list from a file.
///
/// Each line should contain one address in hex format (with or without 0x
/// prefix). Empty lines and lines starting with '#' are ignored. Entries
/// are returned unvalidated; batch resolution decides what to do with
/// malformed ones.
///
/// # Example file format:
/// ```
// 0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb
// 0xdAC17F958D2ee523a2206206994597C13D831ec7
// # This is a comment
// ```
pub fn load_address_list(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read address list file: {:?}", path))?;

    let addresses: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if addresses.is_empty() {
        anyhow::bail!("Address list is empty (no entries found)");
    }

    Ok(addresses)
}
