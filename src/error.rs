use crate::domain::actor::UserId;
use crate::domain::approval::DenialReason;
use crate::domain::money::Currency;
use crate::domain::request::RequestStatus;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Insufficient funds: available {available} {currency}, required {required} {currency}")]
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
        currency: Currency,
    },
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch { expected: Currency, found: Currency },
    #[error("Approval denied: {0}")]
    ApprovalDenied(DenialReason),
    #[error("Cannot {action} a request in status {status}")]
    InvalidTransition {
        status: RequestStatus,
        action: &'static str,
    },
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("Request {0} already exists")]
    DuplicateRequest(u64),
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),
    #[error("Internal error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl WorkflowError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
