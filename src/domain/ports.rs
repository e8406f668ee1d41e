use super::actor::Department;
use super::cash::{CashBalance, LedgerEntry};
use super::modification::{ModificationId, ModificationRequest};
use super::request::{ApprovalRequest, RequestId};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn store(&self, request: ApprovalRequest) -> Result<()>;
    async fn get(&self, id: RequestId) -> Result<Option<ApprovalRequest>>;
    async fn exists(&self, id: RequestId) -> Result<bool>;
    async fn get_all(&self) -> Result<Vec<ApprovalRequest>>;
}

/// Department floats. Balances change only through [`PostingStore::commit`].
#[async_trait]
pub trait CashBalanceStore: Send + Sync {
    async fn get(&self, department: Department) -> Result<Option<CashBalance>>;
    async fn get_all(&self) -> Result<Vec<CashBalance>>;
}

/// Read side of the append-only ledger.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn next_id(&self) -> Result<u64>;
    async fn get_all(&self) -> Result<Vec<LedgerEntry>>;
}

#[async_trait]
pub trait ModificationStore: Send + Sync {
    async fn store(&self, modification: ModificationRequest) -> Result<()>;
    async fn get(&self, id: ModificationId) -> Result<Option<ModificationRequest>>;
    async fn next_id(&self) -> Result<ModificationId>;
    async fn get_all(&self) -> Result<Vec<ModificationRequest>>;
}

/// One cash movement: the float after it, its ledger line and, when the
/// movement pays or returns money for a request, the updated request.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub balance: CashBalance,
    pub entry: LedgerEntry,
    pub request: Option<ApprovalRequest>,
}

#[async_trait]
pub trait PostingStore: Send + Sync {
    /// Writes every part of `posting` or none of it.
    async fn commit(&self, posting: Posting) -> Result<()>;
}

pub type RequestStoreBox = Box<dyn RequestStore>;
pub type CashBalanceStoreBox = Box<dyn CashBalanceStore>;
pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type ModificationStoreBox = Box<dyn ModificationStore>;
pub type PostingStoreBox = Box<dyn PostingStore>;

/// The full set of backends a workflow engine runs on.
pub struct Stores {
    pub requests: RequestStoreBox,
    pub balances: CashBalanceStoreBox,
    pub ledger: LedgerStoreBox,
    pub modifications: ModificationStoreBox,
    pub postings: PostingStoreBox,
}
