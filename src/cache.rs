//! Two-tier snapshot cache
//!
//! Ephemeral in-memory tier with a fixed TTL in front of the durable
//! snapshot store.
//!
//! Strategy:
//! - Reads check the ephemeral tier first, then the durable store; a
//!   durable hit re-populates the ephemeral tier on the way out.
//! - Writes go through to the durable store and then to the ephemeral
//!   tier, always carrying the full snapshot.
//! - Ephemeral entries expire a fixed TTL after insertion, regardless of
//!   how often they are read.

use crate::records::WalletSnapshot;
use crate::store::SnapshotStore;
use alloy_primitives::Address;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

struct MemEntry {
    snapshot: WalletSnapshot,
    stored_at: Instant,
}

impl MemEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Two-tier cache for wallet snapshots.
///
/// The ephemeral tier absorbs repeat lookups; the durable store is the
/// authoritative copy and never expires.
pub struct SnapshotCache<S> {
    store: S,
    mem: Mutex<HashMap<Address, MemEntry>>,
    ttl: Duration,
}

impl<S: SnapshotStore> SnapshotCache<S> {
    /// Create a cache over a durable store with the given ephemeral TTL.
    pub fn new(store: S, ttl: Duration) -> Self {
        Self {
            store,
            mem: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a snapshot: ephemeral tier first, then durable store.
    ///
    /// A durable hit populates the ephemeral tier before returning. A
    /// durable read failure is logged and treated as a miss so the caller
    /// can recompute from chain data.
    pub fn get(&self, addr: Address) -> Option<WalletSnapshot> {
        {
            let mut mem = self.mem.lock().expect("cache lock poisoned");
            match mem.get(&addr) {
                Some(entry) if entry.is_fresh(self.ttl) => {
                    return Some(entry.snapshot.clone());
                }
                Some(_) => {
                    mem.remove(&addr);
                }
                None => {}
            }
        }

        match self.store.find(addr) {
            Ok(Some(snapshot)) => {
                self.insert_mem(addr, snapshot.clone());
                Some(snapshot)
            }
            Ok(None) => None,
            Err(err) => {
                warn!("Durable lookup failed for 0x{:x}: {:#}", addr, err);
                None
            }
        }
    }

    /// Write a snapshot through both tiers.
    ///
    /// The durable write happens first and its failure is returned to the
    /// caller; the ephemeral tier is still populated so the fresh snapshot
    /// stays servable.
    pub fn put(&self, addr: Address, snapshot: &WalletSnapshot) -> Result<()> {
        let durable = self.store.upsert(addr, snapshot);
        self.insert_mem(addr, snapshot.clone());
        durable
    }

    fn insert_mem(&self, addr: Address, snapshot: WalletSnapshot) {
        let mut mem = self.mem.lock().expect("cache lock poisoned");
        mem.insert(
            addr,
            MemEntry {
                snapshot,
                stored_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ActiveDays;
    use alloy_primitives::address;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory SnapshotStore that counts reads and can be made to fail.
    struct MemoryStore {
        entries: Mutex<HashMap<Address, WalletSnapshot>>,
        finds: AtomicUsize,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
                finds: AtomicUsize::new(0),
                fail_reads: false,
                fail_writes: false,
            }
        }

        fn find_count(&self) -> usize {
            self.finds.load(Ordering::SeqCst)
        }
    }

    impl SnapshotStore for MemoryStore {
        fn find(&self, addr: Address) -> Result<Option<WalletSnapshot>> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads {
                return Err(anyhow!("store offline"));
            }
            Ok(self.entries.lock().unwrap().get(&addr).cloned())
        }

        fn upsert(&self, addr: Address, snapshot: &WalletSnapshot) -> Result<()> {
            if self.fail_writes {
                return Err(anyhow!("store offline"));
            }
            self.entries.lock().unwrap().insert(addr, snapshot.clone());
            Ok(())
        }
    }

    fn sample_snapshot(addr: Address, tx_count: u64) -> WalletSnapshot {
        WalletSnapshot {
            address: addr,
            balance: "0.5".to_string(),
            active_days: ActiveDays::default(),
            first_tx_time: Some(1_700_000_000),
            last_tx_time: Some(1_700_090_000),
            tx_count,
            contract_count: 1,
            truncated: false,
            updated_at: 1_700_100_000_000,
        }
    }

    const ADDR: Address = address!("0742d35Cc6634C0532925a3b844Bc9e7595f0bEb");

    #[test]
    fn test_empty_cache_misses() {
        let cache = SnapshotCache::new(MemoryStore::new(), Duration::from_secs(60));
        assert!(cache.get(ADDR).is_none());
    }

    #[test]
    fn test_put_then_get_serves_from_memory() {
        let cache = SnapshotCache::new(MemoryStore::new(), Duration::from_secs(60));
        let snapshot = sample_snapshot(ADDR, 5);

        cache.put(ADDR, &snapshot).unwrap();
        assert_eq!(cache.get(ADDR).unwrap(), snapshot);
        // The fresh memory entry answered; the durable tier was never read
        assert_eq!(cache.store.find_count(), 0);
    }

    #[test]
    fn test_expired_entry_falls_back_to_durable() {
        let cache = SnapshotCache::new(MemoryStore::new(), Duration::ZERO);
        let snapshot = sample_snapshot(ADDR, 5);

        cache.put(ADDR, &snapshot).unwrap();
        // TTL of zero expires the memory entry immediately
        assert_eq!(cache.get(ADDR).unwrap(), snapshot);
        assert_eq!(cache.store.find_count(), 1);
    }

    #[test]
    fn test_durable_hit_repopulates_memory() {
        let store = MemoryStore::new();
        store.upsert(ADDR, &sample_snapshot(ADDR, 9)).unwrap();
        let cache = SnapshotCache::new(store, Duration::from_secs(60));

        assert_eq!(cache.get(ADDR).unwrap().tx_count, 9);
        assert_eq!(cache.store.find_count(), 1);

        // Second read is served by the re-populated memory tier
        assert_eq!(cache.get(ADDR).unwrap().tx_count, 9);
        assert_eq!(cache.store.find_count(), 1);
    }

    #[test]
    fn test_put_populates_memory_even_when_durable_write_fails() {
        let mut store = MemoryStore::new();
        store.fail_writes = true;
        let cache = SnapshotCache::new(store, Duration::from_secs(60));
        let snapshot = sample_snapshot(ADDR, 5);

        assert!(cache.put(ADDR, &snapshot).is_err());
        assert_eq!(cache.get(ADDR).unwrap(), snapshot);
    }

    #[test]
    fn test_durable_read_failure_is_a_miss() {
        let mut store = MemoryStore::new();
        store.fail_reads = true;
        let cache = SnapshotCache::new(store, Duration::from_secs(60));

        assert!(cache.get(ADDR).is_none());
    }

    #[test]
    fn test_put_fully_replaces() {
        let cache = SnapshotCache::new(MemoryStore::new(), Duration::from_secs(60));

        cache.put(ADDR, &sample_snapshot(ADDR, 1)).unwrap();
        cache.put(ADDR, &sample_snapshot(ADDR, 2)).unwrap();

        assert_eq!(cache.get(ADDR).unwrap().tx_count, 2);
    }
}
