//! Snapshot resolution service
//!
//! Orchestrates single-address resolution: validate, consult the cache,
//! fetch chain data, aggregate, persist, populate the cache, return.
//! Concurrent resolutions of the same address share one outstanding
//! computation instead of hitting the chain in parallel.

use crate::activity::aggregate;
use crate::cache::SnapshotCache;
use crate::config::Config;
use crate::error::SnapshotError;
use crate::records::{format_ether, TransactionRecord, WalletSnapshot};
use crate::rpc::ChainData;
use crate::store::SnapshotStore;
use alloy_primitives::{Address, B256};
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Pad an odd-length hex string with a leading zero.
fn pad_hex_string(s: &str) -> String {
    if s.is_empty() {
        return s.to_string();
    }
    if s.len() % 2 == 1 {
        format!("0{}", s)
    } else {
        s.to_string()
    }
}

/// Parse an address from a hex string.
///
/// Accepts addresses with or without 0x prefix. This is the validity
/// predicate for all snapshot operations: anything that does not decode
/// into 20 bytes is rejected.
pub fn parse_address(s: &str) -> Result<Address> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let s = pad_hex_string(s);
    let bytes = hex::decode(&s).with_context(|| format!("Invalid hex address: {}", s))?;

    if bytes.len() != 20 {
        anyhow::bail!(
            "Address must be 20 bytes (40 hex chars), got {} bytes",
            bytes.len()
        );
    }

    Ok(Address::from_slice(&bytes))
}

/// Current wall-clock time as (seconds, milliseconds) since the Unix epoch.
fn unix_now() -> (u64, u64) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_secs(), now.as_millis() as u64)
}

/// Service resolving activity snapshots for single addresses.
///
/// Generic over the chain source and the durable store so tests can run
/// against in-memory doubles.
pub struct SnapshotService<C, S> {
    chain: C,
    cache: SnapshotCache<S>,
    config: Config,
    inflight: Mutex<HashMap<Address, Arc<OnceCell<WalletSnapshot>>>>,
}

impl<C: ChainData, S: SnapshotStore> SnapshotService<C, S> {
    pub fn new(chain: C, cache: SnapshotCache<S>, config: Config) -> Self {
        Self {
            chain,
            cache,
            config,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the activity snapshot for a raw address string.
    ///
    /// The address is validated and normalized here, at the single entry
    /// point; every downstream key (cache, store) uses the parsed 20-byte
    /// form.
    pub async fn resolve(&self, raw: &str) -> Result<WalletSnapshot, SnapshotError> {
        let addr = parse_address(raw.trim()).map_err(|_| SnapshotError::InvalidAddress)?;
        self.resolve_address(addr).await
    }

    /// Resolve a snapshot for an already-validated address.
    pub async fn resolve_address(&self, addr: Address) -> Result<WalletSnapshot, SnapshotError> {
        if let Some(snapshot) = self.cache.get(addr) {
            debug!("Cache hit for 0x{:x}", addr);
            return Ok(snapshot);
        }

        // Concurrent resolvers of the same address share one cell; the
        // first to initialize it does the work, the rest await the result.
        let cell = {
            let mut inflight = self.inflight.lock().expect("inflight lock poisoned");
            inflight
                .entry(addr)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let result = cell.get_or_try_init(|| self.recompute(addr)).await.cloned();

        // Retire the cell so a later miss starts a fresh computation. Only
        // the cell we joined is removed; a newer one stays.
        {
            let mut inflight = self.inflight.lock().expect("inflight lock poisoned");
            if let Some(current) = inflight.get(&addr) {
                if Arc::ptr_eq(current, &cell) {
                    inflight.remove(&addr);
                }
            }
        }

        result
    }

    /// Compute a fresh snapshot from chain data and write it through the
    /// cache tiers.
    async fn recompute(&self, addr: Address) -> Result<WalletSnapshot, SnapshotError> {
        info!("Computing snapshot for 0x{:x}", addr);

        let balance = self
            .chain
            .get_balance(addr)
            .await
            .map_err(|reason| SnapshotError::ChainUnavailable { reason })?;

        let head = self
            .chain
            .block_number()
            .await
            .map_err(|reason| SnapshotError::ChainUnavailable { reason })?;

        let lookback_blocks = self.config.lookback_days * self.config.blocks_per_day;
        let from_block = head.saturating_sub(lookback_blocks);

        let records = self
            .fetch_transactions(addr, from_block, head)
            .await
            .map_err(|reason| SnapshotError::ChainUnavailable { reason })?;

        let (now_secs, now_millis) = unix_now();
        let stats = aggregate(&records, now_secs);

        let snapshot = WalletSnapshot {
            address: addr,
            balance: format_ether(balance),
            active_days: stats.active_days,
            first_tx_time: stats.first_tx_time,
            last_tx_time: stats.last_tx_time,
            tx_count: stats.tx_count,
            contract_count: stats.contract_count,
            truncated: from_block > 0,
            updated_at: now_millis,
        };

        // A failed durable write is reported but never erases the computed
        // snapshot from the response.
        if let Err(err) = self.cache.put(addr, &snapshot) {
            warn!("Persistence unavailable for 0x{:x}: {:#}", addr, err);
        }

        info!(
            "Snapshot for 0x{:x}: {} txs, {} contract calls, balance {}",
            addr, snapshot.tx_count, snapshot.contract_count, snapshot.balance
        );

        Ok(snapshot)
    }

    /// Retrieve the transaction records for an address over a block range.
    ///
    /// Logs are the discovery mechanism; several logs can originate from
    /// one transaction, so hashes are de-duplicated before the bodies are
    /// fetched. Each distinct block is fetched once for its timestamp.
    async fn fetch_transactions(
        &self,
        addr: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransactionRecord>> {
        let logs = self
            .chain
            .get_logs(addr, from_block, to_block)
            .await
            .context("Failed to fetch logs")?;

        debug!(
            "Fetched {} logs for 0x{:x} over blocks {}..={}",
            logs.len(),
            addr,
            from_block,
            to_block
        );

        let mut seen: HashSet<B256> = HashSet::new();
        let mut pending: Vec<(B256, u64)> = Vec::new();
        for log in &logs {
            if seen.insert(log.transaction_hash) {
                pending.push((log.transaction_hash, log.block_number));
            }
        }

        let mut block_timestamps: HashMap<u64, u64> = HashMap::new();
        let mut records = Vec::with_capacity(pending.len());

        for (hash, block_number) in pending {
            let tx = self
                .chain
                .get_transaction_by_hash(hash)
                .await
                .with_context(|| format!("Failed to fetch transaction 0x{:x}", hash))?;

            let timestamp = match block_timestamps.get(&block_number) {
                Some(ts) => *ts,
                None => {
                    let block = self
                        .chain
                        .get_block_by_number(block_number)
                        .await
                        .with_context(|| format!("Failed to fetch block {}", block_number))?;
                    block_timestamps.insert(block_number, block.timestamp);
                    block.timestamp
                }
            };

            records.push(TransactionRecord {
                hash,
                block_number,
                timestamp,
                from: tx.from,
                to: tx.to,
                value: tx.value,
                payload: tx.input,
            });
        }

        Ok(records)
    }
}
