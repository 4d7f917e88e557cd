//! Batch resolution
//!
//! Fans a set of addresses out over the snapshot service with bounded
//! concurrency. Individual failures become per-item records and never
//! abort sibling resolutions.

use crate::config::Config;
use crate::error::SnapshotError;
use crate::records::WalletSnapshot;
use crate::rpc::ChainData;
use crate::service::{parse_address, SnapshotService};
use crate::store::SnapshotStore;
use alloy_primitives::Address;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Outcome for one address in a batch: a snapshot, or an isolated failure.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchResult {
    Snapshot(WalletSnapshot),
    Failed { address: String, error: String },
}

/// Coordinator running batches of snapshot resolutions.
pub struct BatchCoordinator<C, S> {
    service: SnapshotService<C, S>,
    limit: usize,
    max_concurrency: usize,
}

impl<C: ChainData, S: SnapshotStore> BatchCoordinator<C, S> {
    pub fn new(service: SnapshotService<C, S>, config: &Config) -> Self {
        Self {
            service,
            limit: config.batch_limit,
            max_concurrency: config.max_concurrency,
        }
    }

    /// Resolve a batch of raw address strings.
    ///
    /// Malformed entries are dropped up front; the result covers the valid
    /// subset, in input order. The whole batch is rejected before any chain
    /// work when nothing valid remains or the valid count exceeds the
    /// configured limit. A failed item yields a `BatchResult::Failed` in
    /// its slot while its siblings complete normally.
    pub async fn resolve_many(
        &self,
        addresses: &[String],
    ) -> Result<Vec<BatchResult>, SnapshotError> {
        let valid: Vec<Address> = addresses
            .iter()
            .filter_map(|raw| parse_address(raw.trim()).ok())
            .collect();

        if valid.is_empty() {
            return Err(SnapshotError::EmptyBatch);
        }
        if valid.len() > self.limit {
            return Err(SnapshotError::BatchTooLarge {
                count: valid.len(),
                limit: self.limit,
            });
        }

        debug!(
            "Resolving batch of {} addresses ({} submitted)",
            valid.len(),
            addresses.len()
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency.max(1)));
        let tasks = valid.into_iter().map(|addr| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                match self.service.resolve_address(addr).await {
                    Ok(snapshot) => BatchResult::Snapshot(snapshot),
                    Err(err) => {
                        warn!("Batch item 0x{:x} failed: {}", addr, err);
                        BatchResult::Failed {
                            address: format!("0x{:x}", addr),
                            error: err.kind().to_string(),
                        }
                    }
                }
            }
        });

        Ok(join_all(tasks).await)
    }
}
