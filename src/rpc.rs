//! JSON-RPC chain access
//!
//! Defines the `ChainData` trait consumed by the snapshot pipeline and a
//! reqwest-backed Ethereum JSON-RPC implementation. Every call carries an
//! explicit timeout and is retried once on failure.

use crate::types::{Block, LogEntry, Transaction};
use alloy_primitives::{Address, B256, U256};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// Pause between the first failed attempt and the retry.
const RETRY_PAUSE: Duration = Duration::from_millis(200);

/// Chain data required to compute a wallet snapshot.
#[async_trait]
pub trait ChainData: Send + Sync {
    /// Get the current balance of an address in wei.
    async fn get_balance(&self, addr: Address) -> Result<U256>;

    /// Get the current chain head block number.
    async fn block_number(&self) -> Result<u64>;

    /// Get block header data by number.
    async fn get_block_by_number(&self, block: u64) -> Result<Block>;

    /// Get a transaction by hash.
    async fn get_transaction_by_hash(&self, hash: B256) -> Result<Transaction>;

    /// Get logs involving an address within an inclusive block range.
    async fn get_logs(&self, addr: Address, from_block: u64, to_block: u64)
        -> Result<Vec<LogEntry>>;
}

/// JSON-RPC client for Ethereum nodes.
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
}

impl RpcClient {
    /// Create a new RPC client with a per-call timeout.
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, url })
    }

    /// Make a JSON-RPC call, retrying once after a short pause.
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        match self.call_once(method, &params).await {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::debug!("RPC call {} failed ({:#}), retrying once", method, err);
                tokio::time::sleep(RETRY_PAUSE).await;
                self.call_once(method, &params)
                    .await
                    .with_context(|| format!("RPC call {} failed after retry", method))
            }
        }
    }

    async fn call_once(&self, method: &str, params: &Value) -> Result<Value> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .context("Failed to send RPC request")?;

        let json: Value = response
            .json()
            .await
            .context("Failed to parse RPC response")?;

        // Check for RPC error
        if let Some(error) = json.get("error") {
            anyhow::bail!("RPC error: {}", error);
        }

        // Extract result
        json.get("result")
            .cloned()
            .context("RPC response missing 'result' field")
    }
}

#[async_trait]
impl ChainData for RpcClient {
    async fn get_balance(&self, addr: Address) -> Result<U256> {
        let addr_str = format!("0x{:x}", addr);
        let params = json!([addr_str, "latest"]);
        let result = self.call("eth_getBalance", params).await?;

        let balance_str = result
            .as_str()
            .context("Balance response is not a string")?;
        parse_hex_u256(balance_str)
    }

    async fn block_number(&self) -> Result<u64> {
        let result = self.call("eth_blockNumber", json!([])).await?;
        let number_str = result
            .as_str()
            .context("Block number response is not a string")?;
        parse_hex_u64(number_str)
    }

    async fn get_block_by_number(&self, block: u64) -> Result<Block> {
        let params = json!([format!("0x{:x}", block), false]);
        let result = self.call("eth_getBlockByNumber", params).await?;
        serde_json::from_value(result).context("Failed to deserialize block")
    }

    async fn get_transaction_by_hash(&self, hash: B256) -> Result<Transaction> {
        let hash_str = format!("0x{:x}", hash);
        let params = json!([hash_str]);
        let result = self.call("eth_getTransactionByHash", params).await?;
        serde_json::from_value(result).context("Failed to deserialize transaction")
    }

    async fn get_logs(
        &self,
        addr: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>> {
        let params = json!([{
            "address": format!("0x{:x}", addr),
            "fromBlock": format!("0x{:x}", from_block),
            "toBlock": format!("0x{:x}", to_block),
        }]);
        let result = self.call("eth_getLogs", params).await?;
        serde_json::from_value(result).context("Failed to deserialize logs")
    }
}

/// Pad an odd-length hex string with a leading zero.
fn pad_hex_string(s: &str) -> String {
    if s.len() % 2 == 1 {
        format!("0{}", s)
    } else {
        s.to_string()
    }
}

/// Parse a 0x-prefixed hex string into a u64.
fn parse_hex_u64(s: &str) -> Result<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(s, 16).context("Failed to parse hex u64")
}

/// Parse a 0x-prefixed hex string into a U256.
fn parse_hex_u256(s: &str) -> Result<U256> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(U256::ZERO);
    }
    let s = pad_hex_string(s);
    let bytes = hex::decode(&s).context("Failed to decode hex value")?;
    Ok(U256::from_be_slice(&bytes))
}
