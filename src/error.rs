//! Error taxonomy for snapshot resolution
//!
//! Infrastructure code (RPC, store) reports failures through anyhow; the
//! service boundary folds them into these variants so callers can tell a
//! client mistake apart from an upstream outage.

use thiserror::Error;

/// Failure modes surfaced by the snapshot service and batch coordinator.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The input did not parse into a 20-byte address.
    #[error("invalid address")]
    InvalidAddress,

    /// A required chain call failed even after retry.
    #[error("chain unavailable: {reason}")]
    ChainUnavailable { reason: anyhow::Error },

    /// The durable store rejected a read or write.
    #[error("persistence unavailable: {reason}")]
    PersistenceUnavailable { reason: anyhow::Error },

    /// A batch contained no valid addresses.
    #[error("no valid addresses in batch")]
    EmptyBatch,

    /// A batch contained more valid addresses than the configured limit.
    #[error("batch of {count} addresses exceeds limit of {limit}")]
    BatchTooLarge { count: usize, limit: usize },
}

impl SnapshotError {
    /// Stable short name for per-item failure records and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SnapshotError::InvalidAddress => "invalid_address",
            SnapshotError::ChainUnavailable { .. } => "chain_unavailable",
            SnapshotError::PersistenceUnavailable { .. } => "persistence_unavailable",
            SnapshotError::EmptyBatch => "empty_batch",
            SnapshotError::BatchTooLarge { .. } => "batch_too_large",
        }
    }
}
