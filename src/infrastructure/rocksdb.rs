use crate::domain::actor::Department;
use crate::domain::cash::{CashBalance, LedgerEntry};
use crate::domain::modification::{ModificationId, ModificationRequest};
use crate::domain::ports::{
    CashBalanceStore, LedgerStore, ModificationStore, Posting, PostingStore, RequestStore, Stores,
};
use crate::domain::request::{ApprovalRequest, RequestId};
use crate::error::{Result, WorkflowError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for approval requests, keyed by request id.
pub const CF_REQUESTS: &str = "requests";
/// Column Family for department cash floats, keyed by department name.
pub const CF_BALANCES: &str = "balances";
/// Column Family for the cash ledger, keyed by entry id.
pub const CF_LEDGER: &str = "ledger";
/// Column Family for modification requests, keyed by modification id.
pub const CF_MODIFICATIONS: &str = "modifications";

const COLUMN_FAMILIES: [&str; 4] = [CF_REQUESTS, CF_BALANCES, CF_LEDGER, CF_MODIFICATIONS];

/// A persistent store implementation using RocksDB.
///
/// Every table lives in its own Column Family with JSON-encoded values.
/// Numeric keys are big-endian so iteration follows id order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// any missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            WorkflowError::Internal(format!("{name} column family not found").into())
        })
    }

    fn put<T: Serialize>(&self, cf: &str, key: impl AsRef<[u8]>, value: &T) -> Result<()> {
        let handle = self.cf(cf)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(handle, key, bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf: &str, key: impl AsRef<[u8]>) -> Result<Option<T>> {
        let handle = self.cf(cf)?;
        match self.db.get_pinned_cf(handle, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn values<T: DeserializeOwned>(&self, cf: &str) -> Result<Vec<T>> {
        let handle = self.cf(cf)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(handle, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    /// One past the highest big-endian `u64` key in `cf`, starting at 1.
    fn next_key(&self, cf: &str) -> Result<u64> {
        let handle = self.cf(cf)?;
        match self.db.iterator_cf(handle, IteratorMode::End).next() {
            Some(item) => {
                let (key, _value) = item?;
                let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                    WorkflowError::Internal(format!("malformed key in {cf}").into())
                })?;
                Ok(u64::from_be_bytes(bytes) + 1)
            }
            None => Ok(1),
        }
    }
}

#[async_trait]
impl RequestStore for RocksDBStore {
    async fn store(&self, request: ApprovalRequest) -> Result<()> {
        self.put(CF_REQUESTS, request.id.to_be_bytes(), &request)
    }

    async fn get(&self, id: RequestId) -> Result<Option<ApprovalRequest>> {
        self.fetch(CF_REQUESTS, id.to_be_bytes())
    }

    async fn exists(&self, id: RequestId) -> Result<bool> {
        let handle = self.cf(CF_REQUESTS)?;
        // Just check if the key exists without decoding the value
        Ok(self.db.get_pinned_cf(handle, id.to_be_bytes())?.is_some())
    }

    async fn get_all(&self) -> Result<Vec<ApprovalRequest>> {
        self.values(CF_REQUESTS)
    }
}

#[async_trait]
impl CashBalanceStore for RocksDBStore {
    async fn get(&self, department: Department) -> Result<Option<CashBalance>> {
        self.fetch(CF_BALANCES, department.as_str())
    }

    async fn get_all(&self) -> Result<Vec<CashBalance>> {
        let mut balances: Vec<CashBalance> = self.values(CF_BALANCES)?;
        balances.sort_by_key(|balance| balance.department);
        Ok(balances)
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn next_id(&self) -> Result<u64> {
        self.next_key(CF_LEDGER)
    }

    async fn get_all(&self) -> Result<Vec<LedgerEntry>> {
        self.values(CF_LEDGER)
    }
}

#[async_trait]
impl ModificationStore for RocksDBStore {
    async fn store(&self, modification: ModificationRequest) -> Result<()> {
        self.put(CF_MODIFICATIONS, modification.id.to_be_bytes(), &modification)
    }

    async fn get(&self, id: ModificationId) -> Result<Option<ModificationRequest>> {
        self.fetch(CF_MODIFICATIONS, id.to_be_bytes())
    }

    async fn next_id(&self) -> Result<ModificationId> {
        self.next_key(CF_MODIFICATIONS)
    }

    async fn get_all(&self) -> Result<Vec<ModificationRequest>> {
        self.values(CF_MODIFICATIONS)
    }
}

#[async_trait]
impl PostingStore for RocksDBStore {
    /// Writes the balance, the ledger entry and the request in one atomic
    /// `WriteBatch` across their column families.
    async fn commit(&self, posting: Posting) -> Result<()> {
        let mut batch = WriteBatch::default();
        batch.put_cf(
            self.cf(CF_BALANCES)?,
            posting.balance.department.as_str(),
            serde_json::to_vec(&posting.balance)?,
        );
        batch.put_cf(
            self.cf(CF_LEDGER)?,
            posting.entry.id.to_be_bytes(),
            serde_json::to_vec(&posting.entry)?,
        );
        if let Some(request) = &posting.request {
            batch.put_cf(
                self.cf(CF_REQUESTS)?,
                request.id.to_be_bytes(),
                serde_json::to_vec(request)?,
            );
        }
        self.db.write(batch)?;
        Ok(())
    }
}

impl Stores {
    /// All backends sharing one RocksDB instance.
    pub fn rocksdb(store: RocksDBStore) -> Self {
        Self {
            requests: Box::new(store.clone()),
            balances: Box::new(store.clone()),
            ledger: Box::new(store.clone()),
            modifications: Box::new(store.clone()),
            postings: Box::new(store),
        }
    }
}
