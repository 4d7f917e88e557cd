//! SnapshotStore trait and RocksDB implementation
//!
//! Provides the durable tier for wallet snapshots. Uses RocksDB with a
//! dedicated column family; one record per address, fully replaced on write.

use crate::keys::encode_snapshot_key;
use crate::records::WalletSnapshot;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use rocksdb::{ColumnFamilyDescriptor, Options, DB};
use std::path::Path;

/// Trait defining the interface for durable snapshot storage.
///
/// Records never expire; `upsert` is authoritative and replaces any
/// previous record for the address in full.
pub trait SnapshotStore: Send + Sync {
    /// Get the stored snapshot for an address.
    fn find(&self, addr: Address) -> Result<Option<WalletSnapshot>>;

    /// Insert or fully replace the snapshot for an address.
    fn upsert(&self, addr: Address, snapshot: &WalletSnapshot) -> Result<()>;
}

/// RocksDB-backed implementation of SnapshotStore.
///
/// Snapshots live in the "snapshots" column family, keyed by prefixed
/// address and encoded with postcard.
pub struct RocksSnapshotStore {
    db: DB,
}

impl RocksSnapshotStore {
    /// Open or create a RocksDB database at the given path.
    ///
    /// Creates the required column family if it doesn't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let column_families = vec![ColumnFamilyDescriptor::new("snapshots", Options::default())];

        let db = DB::open_cf_descriptors(&opts, path, column_families)
            .context("Failed to open RocksDB database")?;

        Ok(Self { db })
    }

    /// Get the snapshots column family handle.
    fn get_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle("snapshots")
            .context("Column family 'snapshots' not found")
    }
}

impl SnapshotStore for RocksSnapshotStore {
    fn find(&self, addr: Address) -> Result<Option<WalletSnapshot>> {
        let cf = self.get_cf()?;
        let key = encode_snapshot_key(addr);
        match self.db.get_cf(cf, &key).context("Failed to get snapshot")? {
            Some(bytes) => {
                let snapshot =
                    postcard::from_bytes(&bytes).context("Failed to deserialize snapshot")?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    fn upsert(&self, addr: Address, snapshot: &WalletSnapshot) -> Result<()> {
        let cf = self.get_cf()?;
        let key = encode_snapshot_key(addr);
        let value = postcard::to_allocvec(snapshot).context("Failed to serialize snapshot")?;
        self.db
            .put_cf(cf, &key, &value)
            .context("Failed to put snapshot")?;
        Ok(())
    }
}
