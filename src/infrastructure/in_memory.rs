use crate::domain::actor::Department;
use crate::domain::cash::{CashBalance, LedgerEntry};
use crate::domain::modification::{ModificationId, ModificationRequest};
use crate::domain::ports::{
    CashBalanceStore, LedgerStore, ModificationStore, Posting, PostingStore, RequestStore, Stores,
};
use crate::domain::request::{ApprovalRequest, RequestId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for approval requests.
///
/// Uses `Arc<RwLock<BTreeMap<..>>>` so clones share state and listings come
/// back ordered by request id.
#[derive(Default, Clone)]
pub struct InMemoryRequestStore {
    requests: Arc<RwLock<BTreeMap<RequestId, ApprovalRequest>>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn store(&self, request: ApprovalRequest) -> Result<()> {
        let mut requests = self.requests.write().await;
        requests.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: RequestId) -> Result<Option<ApprovalRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.get(&id).cloned())
    }

    async fn exists(&self, id: RequestId) -> Result<bool> {
        let requests = self.requests.read().await;
        Ok(requests.contains_key(&id))
    }

    async fn get_all(&self) -> Result<Vec<ApprovalRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.values().cloned().collect())
    }
}

/// In-memory cash floats, one per department.
#[derive(Default, Clone)]
pub struct InMemoryCashBalanceStore {
    balances: Arc<RwLock<BTreeMap<Department, CashBalance>>>,
}

impl InMemoryCashBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CashBalanceStore for InMemoryCashBalanceStore {
    async fn get(&self, department: Department) -> Result<Option<CashBalance>> {
        let balances = self.balances.read().await;
        Ok(balances.get(&department).cloned())
    }

    async fn get_all(&self) -> Result<Vec<CashBalance>> {
        let balances = self.balances.read().await;
        Ok(balances.values().cloned().collect())
    }
}

/// Append-only in-memory ledger.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    entries: Arc<RwLock<Vec<LedgerEntry>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn next_id(&self) -> Result<u64> {
        let entries = self.entries.read().await;
        Ok(entries.last().map_or(1, |entry| entry.id + 1))
    }

    async fn get_all(&self) -> Result<Vec<LedgerEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.clone())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryModificationStore {
    modifications: Arc<RwLock<BTreeMap<ModificationId, ModificationRequest>>>,
}

impl InMemoryModificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModificationStore for InMemoryModificationStore {
    async fn store(&self, modification: ModificationRequest) -> Result<()> {
        let mut modifications = self.modifications.write().await;
        modifications.insert(modification.id, modification);
        Ok(())
    }

    async fn get(&self, id: ModificationId) -> Result<Option<ModificationRequest>> {
        let modifications = self.modifications.read().await;
        Ok(modifications.get(&id).cloned())
    }

    async fn next_id(&self) -> Result<ModificationId> {
        let modifications = self.modifications.read().await;
        Ok(modifications.keys().next_back().map_or(1, |id| id + 1))
    }

    async fn get_all(&self) -> Result<Vec<ModificationRequest>> {
        let modifications = self.modifications.read().await;
        Ok(modifications.values().cloned().collect())
    }
}

/// Commits postings into the shared maps of the request, balance and ledger
/// stores it was built from.
#[derive(Clone)]
pub struct InMemoryPostingStore {
    requests: InMemoryRequestStore,
    balances: InMemoryCashBalanceStore,
    ledger: InMemoryLedgerStore,
}

impl InMemoryPostingStore {
    pub fn new(
        requests: &InMemoryRequestStore,
        balances: &InMemoryCashBalanceStore,
        ledger: &InMemoryLedgerStore,
    ) -> Self {
        Self {
            requests: requests.clone(),
            balances: balances.clone(),
            ledger: ledger.clone(),
        }
    }
}

#[async_trait]
impl PostingStore for InMemoryPostingStore {
    async fn commit(&self, posting: Posting) -> Result<()> {
        // Lock order: requests, balances, ledger. Nothing below can fail, so
        // readers see either none of the posting or all of it.
        let mut requests = self.requests.requests.write().await;
        let mut balances = self.balances.balances.write().await;
        let mut entries = self.ledger.entries.write().await;

        if let Some(request) = posting.request {
            requests.insert(request.id, request);
        }
        balances.insert(posting.balance.department, posting.balance);
        entries.push(posting.entry);
        Ok(())
    }
}

impl Stores {
    /// Fresh, empty in-memory backends.
    pub fn in_memory() -> Self {
        let requests = InMemoryRequestStore::new();
        let balances = InMemoryCashBalanceStore::new();
        let ledger = InMemoryLedgerStore::new();
        let postings = InMemoryPostingStore::new(&requests, &balances, &ledger);
        Self {
            requests: Box::new(requests),
            balances: Box::new(balances),
            ledger: Box::new(ledger),
            modifications: Box::new(InMemoryModificationStore::new()),
            postings: Box::new(postings),
        }
    }
}
