//! Record types for wallet activity data
//!
//! `TransactionRecord` is the in-memory shape handed to aggregation;
//! `WalletSnapshot` is the unit of caching, storage, and output. Snapshots
//! use postcard for binary storage encoding and serde camelCase names for
//! JSON output.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Wei per ether (10^18).
const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// A single transaction touching an address, recovered from chain data.
///
/// Built fresh on every snapshot computation and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Transaction hash
    pub hash: B256,
    /// Number of the containing block
    pub block_number: u64,
    /// Timestamp of the containing block (Unix epoch seconds)
    pub timestamp: u64,
    /// Sender address
    pub from: Address,
    /// Recipient address (None for contract creation)
    pub to: Option<Address>,
    /// Value transferred in wei
    pub value: U256,
    /// Call data carried by the transaction (empty for plain transfers)
    pub payload: Vec<u8>,
}

impl TransactionRecord {
    /// A contract interaction is any transaction carrying call data beyond
    /// a plain value transfer.
    pub fn is_contract_interaction(&self) -> bool {
        !self.payload.is_empty()
    }
}

/// Distinct active days over rolling windows ending at computation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDays {
    /// Distinct UTC days with activity in the last 1 day
    pub day: u32,
    /// Distinct UTC days with activity in the last 7 days
    pub week: u32,
    /// Distinct UTC days with activity in the last 30 days
    pub month: u32,
}

/// Activity snapshot for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSnapshot {
    /// The address this snapshot describes
    pub address: Address,
    /// Current balance as a decimal string in ether units
    pub balance: String,
    /// Distinct active day counts per window
    pub active_days: ActiveDays,
    /// Timestamp of the earliest observed transaction (epoch seconds)
    pub first_tx_time: Option<u64>,
    /// Timestamp of the latest observed transaction (epoch seconds)
    pub last_tx_time: Option<u64>,
    /// Number of observed transactions
    pub tx_count: u64,
    /// Number of observed contract interactions
    pub contract_count: u64,
    /// True when history older than the lookback window was not scanned
    pub truncated: bool,
    /// Snapshot computation time (Unix epoch milliseconds)
    pub updated_at: u64,
}

/// Format a wei amount as a decimal string in ether units.
///
/// Whole-ether amounts render without a decimal point; fractional parts
/// keep significant digits only.
pub fn format_ether(wei: U256) -> String {
    let divisor = U256::from(WEI_PER_ETHER);
    let whole = wei / divisor;
    let frac = wei % divisor;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>18}", frac.to_string());
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
