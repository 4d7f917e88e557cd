//! Chainpulse - wallet activity snapshots from chain data
//!
//! This library derives per-address activity snapshots (balance, first and
//! last transaction times, transaction and contract-interaction counts,
//! distinct active days over rolling windows) from Ethereum JSON-RPC data.
//! Snapshots are served through a two-tier cache: a short-TTL in-memory
//! tier over a durable RocksDB store.

pub mod activity;
pub mod batch;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod keys;
pub mod records;
pub mod rpc;
pub mod service;
pub mod store;
pub mod types;

// Re-export the main types for convenience
pub use batch::{BatchCoordinator, BatchResult};
pub use cache::SnapshotCache;
pub use config::Config;
pub use error::SnapshotError;
pub use records::{ActiveDays, TransactionRecord, WalletSnapshot};
pub use rpc::{ChainData, RpcClient};
pub use service::SnapshotService;
pub use store::{RocksSnapshotStore, SnapshotStore};
