use super::engine::WorkflowEngine;
use crate::domain::actor::{Actor, Department, Role};
use crate::domain::cash::{Direction, LedgerEntry, PaymentMethod};
use crate::domain::money::Money;
use crate::domain::ports::Posting;
use crate::domain::request::{ApprovalRequest, PendingPayment, RequestId, RequestStatus};
use crate::error::{Result, WorkflowError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

/// Ledger line before it is given an id and stamped with the new balance.
struct Movement<'a> {
    department: Department,
    direction: Direction,
    amount: Money,
    request: Option<RequestId>,
    method: Option<PaymentMethod>,
    note: Option<String>,
    actor: &'a Actor,
    at: DateTime<Utc>,
}

impl WorkflowEngine {
    /// Tops up a department's cash float.
    #[instrument(skip(self, actor, note), fields(actor = %actor.id))]
    pub async fn deposit_cash(
        &self,
        actor: &Actor,
        department: Department,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<LedgerEntry> {
        if !matches!(actor.role, Role::Finance | Role::Admin) {
            return Err(WorkflowError::Unauthorized(format!(
                "{} ({}) cannot deposit cash",
                actor.id, actor.role
            )));
        }
        let amount = Money::positive(amount, self.config.currency)?;

        let _guard = self.write_lock().await;
        let posting = self
            .stage(Movement {
                department,
                direction: Direction::Credit,
                amount,
                request: None,
                method: Some(PaymentMethod::Cash),
                note: note.filter(|n| !n.trim().is_empty()),
                actor,
                at: Utc::now(),
            })
            .await?;
        let entry = posting.entry.clone();
        self.stores.postings.commit(posting).await?;

        info!(%amount, balance = %entry.balance_after, "cash deposited");
        Ok(entry)
    }

    /// Pays a fully approved request out of the payer department's float.
    ///
    /// Without `partial` the whole outstanding amount is paid. A cash payment
    /// settles immediately; a bank payment parks the request in `Processing`
    /// until an admin confirms it. If the float cannot cover the amount the
    /// call fails with [`WorkflowError::InsufficientFunds`]. The debit, its
    /// ledger line and the request update are committed together, so any
    /// failure leaves all three untouched.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn process_payment(
        &self,
        id: RequestId,
        actor: &Actor,
        method: PaymentMethod,
        partial: Option<Decimal>,
    ) -> Result<LedgerEntry> {
        let _guard = self.write_lock().await;

        let mut request = self.load_request(id).await?;
        if request.status != RequestStatus::FullyApproved {
            return Err(WorkflowError::InvalidTransition {
                status: request.status,
                action: "pay",
            });
        }
        if actor.role != Role::Finance {
            return Err(WorkflowError::Unauthorized(format!(
                "{} ({}) cannot process payments",
                actor.id, actor.role
            )));
        }
        if request.requested_by == actor.id {
            return Err(WorkflowError::Unauthorized(
                "requestor cannot pay out their own request".to_string(),
            ));
        }

        let outstanding = request.outstanding()?;
        let amount = match partial {
            Some(value) => {
                let amount = Money::positive(value, request.amount.currency())?;
                if !outstanding.covers(&amount)? {
                    return Err(WorkflowError::Validation(format!(
                        "payment of {amount} exceeds outstanding {outstanding}"
                    )));
                }
                amount
            }
            None => outstanding,
        };

        let at = Utc::now();
        let posting = self
            .stage(Movement {
                department: actor.department,
                direction: Direction::Debit,
                amount,
                request: Some(id),
                method: Some(method),
                note: request.description.clone(),
                actor,
                at,
            })
            .await
            .inspect_err(|e| {
                if matches!(e, WorkflowError::InsufficientFunds { .. }) {
                    warn!(%amount, department = %actor.department, "payment refused: {e}");
                }
            })?;

        match method {
            PaymentMethod::Cash => request.settle(amount)?,
            PaymentMethod::Bank => request.hold_payment(PendingPayment {
                amount,
                method,
                department: actor.department,
                processed_by: actor.id.clone(),
                processed_at: at,
                ledger_entry: posting.entry.id,
            }),
        }
        let entry = posting.entry.clone();
        self.stores
            .postings
            .commit(Posting {
                request: Some(request.clone()),
                ..posting
            })
            .await?;

        info!(%amount, %method, status = %request.status, "payment processed");
        Ok(entry)
    }

    /// Admin sign-off on a bank payment in `Processing`.
    #[instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn confirm_bank_payment(
        &self,
        id: RequestId,
        actor: &Actor,
    ) -> Result<ApprovalRequest> {
        let _guard = self.write_lock().await;

        let mut request = self.load_request(id).await?;
        self.authorize_bank_review(&request, actor)?;

        let pending = request.take_pending_payment("confirm")?;
        request.settle(pending.amount)?;
        self.stores.requests.store(request.clone()).await?;

        info!(amount = %pending.amount, status = %request.status, "bank payment confirmed");
        Ok(request)
    }

    /// Declines a bank payment in `Processing`, crediting the debit back to the
    /// float it came from. The request returns to `FullyApproved`.
    #[instrument(skip(self, actor, reason), fields(actor = %actor.id))]
    pub async fn reverse_bank_payment(
        &self,
        id: RequestId,
        actor: &Actor,
        reason: &str,
    ) -> Result<LedgerEntry> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::Validation(
                "A reversal reason is required".to_string(),
            ));
        }

        let _guard = self.write_lock().await;

        let mut request = self.load_request(id).await?;
        self.authorize_bank_review(&request, actor)?;

        let pending = request.take_pending_payment("reverse")?;
        let posting = self
            .stage(Movement {
                department: pending.department,
                direction: Direction::Credit,
                amount: pending.amount,
                request: Some(id),
                method: Some(pending.method),
                note: Some(format!(
                    "Reversal of entry #{}: {reason}",
                    pending.ledger_entry
                )),
                actor,
                at: Utc::now(),
            })
            .await?;
        let entry = posting.entry.clone();
        self.stores
            .postings
            .commit(Posting {
                request: Some(request),
                ..posting
            })
            .await?;

        info!(amount = %pending.amount, reason, "bank payment reversed");
        Ok(entry)
    }

    fn authorize_bank_review(&self, request: &ApprovalRequest, actor: &Actor) -> Result<()> {
        if !actor.is_admin() {
            return Err(WorkflowError::Unauthorized(format!(
                "{} ({}) cannot review bank payments",
                actor.id, actor.role
            )));
        }
        if request.requested_by == actor.id {
            return Err(WorkflowError::Unauthorized(
                "requestor cannot review their own payment".to_string(),
            ));
        }
        if let Some(pending) = &request.pending_payment
            && pending.processed_by == actor.id
        {
            return Err(WorkflowError::Unauthorized(
                "payer cannot confirm their own bank payment".to_string(),
            ));
        }
        Ok(())
    }

    /// Works out the float and ledger line a movement produces without
    /// writing anything. Callers must hold the write lock until the posting
    /// is committed.
    async fn stage(&self, movement: Movement<'_>) -> Result<Posting> {
        let mut balance = self.balance(movement.department).await?;
        match movement.direction {
            Direction::Credit => balance.credit(movement.amount, movement.at)?,
            Direction::Debit => balance.debit(movement.amount, movement.at)?,
        }

        let entry = LedgerEntry {
            id: self.stores.ledger.next_id().await?,
            department: movement.department,
            direction: movement.direction,
            amount: movement.amount,
            balance_after: balance.available,
            request: movement.request,
            method: movement.method,
            note: movement.note,
            recorded_by: movement.actor.id.clone(),
            recorded_at: movement.at,
        };

        Ok(Posting {
            balance,
            entry,
            request: None,
        })
    }
}
