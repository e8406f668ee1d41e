use crate::config::WorkflowConfig;
use crate::domain::actor::{Actor, Department};
use crate::domain::approval::{ApprovalCheck, check_separation_of_duties};
use crate::domain::cash::{CashBalance, LedgerEntry};
use crate::domain::modification::ModificationRequest;
use crate::domain::money::Money;
use crate::domain::ports::Stores;
use crate::domain::request::{ApprovalRequest, RequestId, RequestKind};
use crate::domain::status::{StatusLabel, classify};
use crate::error::{Result, WorkflowError};
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, instrument};

/// Fields a user fills in when raising a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: RequestId,
    pub kind: RequestKind,
    /// Defaults to the submitter's own department.
    pub department: Option<Department>,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// The main entry point of the approval workflow.
///
/// `WorkflowEngine` owns the storage backends. Every mutating operation takes
/// the write lock first, so each read-modify-write cycle against the stores
/// is applied in order and never interleaves with another.
pub struct WorkflowEngine {
    pub(crate) stores: Stores,
    pub(crate) config: WorkflowConfig,
    writer: Mutex<()>,
}

impl WorkflowEngine {
    pub fn new(stores: Stores, config: WorkflowConfig) -> Self {
        Self {
            stores,
            config,
            writer: Mutex::new(()),
        }
    }

    pub(crate) async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    pub(crate) async fn load_request(&self, id: RequestId) -> Result<ApprovalRequest> {
        self.stores
            .requests
            .get(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("Request", id))
    }

    /// Records a new request in `Pending`. Request ids are never reused.
    #[instrument(skip(self, actor, submission), fields(request = submission.id, actor = %actor.id))]
    pub async fn submit_request(
        &self,
        actor: &Actor,
        submission: Submission,
    ) -> Result<ApprovalRequest> {
        let _guard = self.write_lock().await;

        if self.stores.requests.exists(submission.id).await? {
            return Err(WorkflowError::DuplicateRequest(submission.id));
        }

        let amount = Money::positive(submission.amount, self.config.currency)?;
        let request = ApprovalRequest::new(
            submission.id,
            submission.kind,
            submission.department.unwrap_or(actor.department),
            actor.id.clone(),
            amount,
            submission.description.filter(|d| !d.trim().is_empty()),
            self.config.policy.admin_approvals_required(&amount),
            Utc::now(),
        );

        self.stores.requests.store(request.clone()).await?;
        info!(
            kind = %request.kind,
            department = %request.department,
            amount = %request.amount,
            admin_approvals = request.admin_approvals_required,
            "request submitted"
        );
        Ok(request)
    }

    /// Runs the separation-of-duties guard without changing anything.
    pub async fn check_approval(&self, id: RequestId, actor: &Actor) -> Result<ApprovalCheck> {
        let request = self.load_request(id).await?;
        Ok(check_separation_of_duties(&request, actor))
    }

    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn approve(&self, id: RequestId, actor: &Actor) -> Result<ApprovalRequest> {
        let _guard = self.write_lock().await;

        let mut request = self.load_request(id).await?;
        let stage = request.approve(actor, Utc::now())?;
        self.stores.requests.store(request.clone()).await?;

        info!(%stage, status = %request.status, "request approved");
        Ok(request)
    }

    #[instrument(skip(self, actor, reason), fields(actor = %actor.id))]
    pub async fn reject(&self, id: RequestId, actor: &Actor, reason: &str) -> Result<ApprovalRequest> {
        let _guard = self.write_lock().await;

        let mut request = self.load_request(id).await?;
        request.reject(actor, reason, Utc::now())?;
        self.stores.requests.store(request.clone()).await?;

        info!(reason, "request rejected");
        Ok(request)
    }

    pub async fn request(&self, id: RequestId) -> Result<ApprovalRequest> {
        self.load_request(id).await
    }

    pub async fn requests(&self) -> Result<Vec<ApprovalRequest>> {
        self.stores.requests.get_all().await
    }

    pub async fn classify(&self, id: RequestId) -> Result<StatusLabel> {
        Ok(classify(&self.load_request(id).await?))
    }

    /// Current float of `department`; departments never topped up hold zero.
    pub async fn balance(&self, department: Department) -> Result<CashBalance> {
        Ok(self
            .stores
            .balances
            .get(department)
            .await?
            .unwrap_or_else(|| CashBalance::new(department, self.config.currency)))
    }

    pub async fn balances(&self) -> Result<Vec<CashBalance>> {
        self.stores.balances.get_all().await
    }

    pub async fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        self.stores.ledger.get_all().await
    }

    pub async fn modifications(&self) -> Result<Vec<ModificationRequest>> {
        self.stores.modifications.get_all().await
    }
}
