use super::actor::{Actor, Department, UserId};
use super::approval::{Approval, ApprovalStage, check_separation_of_duties};
use super::cash::PaymentMethod;
use super::money::Money;
use crate::error::{Result, WorkflowError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Expense,
    Payment,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => f.write_str("expense"),
            Self::Payment => f.write_str("payment"),
        }
    }
}

/// Raw lifecycle status of a request.
///
/// `Rejected` and `Paid` are terminal. `Processing` means a bank payment is
/// waiting for an admin to confirm it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    FinanceApproved,
    Admin1Approved,
    FullyApproved,
    Processing,
    Paid,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::FinanceApproved => "finance_approved",
            Self::Admin1Approved => "admin1_approved",
            Self::FullyApproved => "fully_approved",
            Self::Processing => "processing",
            Self::Paid => "paid",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub by: UserId,
    pub at: DateTime<Utc>,
    pub reason: String,
    /// Stage the request was waiting on when it was turned down.
    pub stage: ApprovalStage,
}

/// A bank payment debited from a cash float but not yet confirmed by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPayment {
    pub amount: Money,
    pub method: PaymentMethod,
    pub department: Department,
    pub processed_by: UserId,
    pub processed_at: DateTime<Utc>,
    pub ledger_entry: u64,
}

/// An expense or payment request moving through the approval chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: RequestId,
    pub kind: RequestKind,
    pub department: Department,
    pub requested_by: UserId,
    pub description: Option<String>,
    pub amount: Money,
    /// Total settled so far; partial payments accumulate here.
    pub paid: Money,
    pub status: RequestStatus,
    /// One or two, fixed at submission time.
    pub admin_approvals_required: u8,
    pub finance_approval: Option<Approval>,
    pub admin_approval_1: Option<Approval>,
    pub admin_approval_2: Option<Approval>,
    pub rejection: Option<Rejection>,
    pub pending_payment: Option<PendingPayment>,
    pub created_at: DateTime<Utc>,
}

impl ApprovalRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RequestId,
        kind: RequestKind,
        department: Department,
        requested_by: UserId,
        amount: Money,
        description: Option<String>,
        admin_approvals_required: u8,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            department,
            requested_by,
            description,
            paid: Money::zero(amount.currency()),
            amount,
            status: RequestStatus::Pending,
            admin_approvals_required: admin_approvals_required.clamp(1, 2),
            finance_approval: None,
            admin_approval_1: None,
            admin_approval_2: None,
            rejection: None,
            pending_payment: None,
            created_at,
        }
    }

    /// The stage this request is waiting on, if any.
    pub fn awaiting_stage(&self) -> Option<ApprovalStage> {
        match self.status {
            RequestStatus::Pending => Some(ApprovalStage::Finance),
            RequestStatus::FinanceApproved => Some(ApprovalStage::Admin1),
            RequestStatus::Admin1Approved if self.admin_approvals_required > 1 => {
                Some(ApprovalStage::Admin2)
            }
            _ => None,
        }
    }

    /// The stage `user` already signed, if any.
    pub fn approved_stage_of(&self, user: &UserId) -> Option<ApprovalStage> {
        [
            (ApprovalStage::Finance, &self.finance_approval),
            (ApprovalStage::Admin1, &self.admin_approval_1),
            (ApprovalStage::Admin2, &self.admin_approval_2),
        ]
        .into_iter()
        .find_map(|(stage, approval)| {
            approval
                .as_ref()
                .filter(|approval| &approval.by == user)
                .map(|_| stage)
        })
    }

    /// Records `actor`'s approval at the current stage and advances the status.
    pub fn approve(&mut self, actor: &Actor, at: DateTime<Utc>) -> Result<ApprovalStage> {
        let stage = check_separation_of_duties(self, actor).into_result()?;
        let approval = Some(Approval {
            by: actor.id.clone(),
            at,
        });

        match stage {
            ApprovalStage::Finance => {
                self.finance_approval = approval;
                self.status = RequestStatus::FinanceApproved;
            }
            ApprovalStage::Admin1 => {
                self.admin_approval_1 = approval;
                self.status = if self.admin_approvals_required > 1 {
                    RequestStatus::Admin1Approved
                } else {
                    RequestStatus::FullyApproved
                };
            }
            ApprovalStage::Admin2 => {
                self.admin_approval_2 = approval;
                self.status = RequestStatus::FullyApproved;
            }
        }

        Ok(stage)
    }

    /// Turns the request down while it waits on an approval stage. The actor
    /// must hold the role that stage needs. Rejection is terminal.
    pub fn reject(&mut self, actor: &Actor, reason: &str, at: DateTime<Utc>) -> Result<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::Validation(
                "A rejection reason is required".to_string(),
            ));
        }

        let Some(stage) = self.awaiting_stage() else {
            return Err(WorkflowError::InvalidTransition {
                status: self.status,
                action: "reject",
            });
        };

        if self.requested_by == actor.id {
            return Err(WorkflowError::Unauthorized(
                "requestor cannot reject their own request".to_string(),
            ));
        }
        if !stage.permits(actor.role) {
            return Err(WorkflowError::Unauthorized(format!(
                "{} ({}) cannot reject a request in status {}",
                actor.id, actor.role, self.status
            )));
        }

        self.rejection = Some(Rejection {
            by: actor.id.clone(),
            at,
            reason: reason.to_string(),
            stage,
        });
        self.status = RequestStatus::Rejected;
        Ok(())
    }

    /// Amount still to be paid out.
    pub fn outstanding(&self) -> Result<Money> {
        self.amount.checked_sub(self.paid)
    }

    /// Adds a settled payment and moves to `Paid` once nothing is outstanding.
    pub fn settle(&mut self, amount: Money) -> Result<()> {
        let paid = self.paid.checked_add(amount)?;
        if !self.amount.covers(&paid)? {
            return Err(WorkflowError::Validation(format!(
                "payment of {amount} exceeds outstanding {}",
                self.outstanding()?
            )));
        }
        self.paid = paid;
        self.status = if self.outstanding()?.is_zero() {
            RequestStatus::Paid
        } else {
            RequestStatus::FullyApproved
        };
        Ok(())
    }

    /// Parks a bank payment until an admin confirms it.
    pub fn hold_payment(&mut self, pending: PendingPayment) {
        self.pending_payment = Some(pending);
        self.status = RequestStatus::Processing;
    }

    /// Takes the parked bank payment, leaving the request ready to be settled
    /// or paid again.
    pub fn take_pending_payment(&mut self, action: &'static str) -> Result<PendingPayment> {
        if self.status != RequestStatus::Processing {
            return Err(WorkflowError::InvalidTransition {
                status: self.status,
                action,
            });
        }
        let pending = self.pending_payment.take().ok_or_else(|| {
            WorkflowError::Internal(
                format!("request {} is processing without a pending payment", self.id).into(),
            )
        })?;
        self.status = RequestStatus::FullyApproved;
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::Role;
    use crate::domain::approval::DenialReason;
    use crate::domain::money::Currency;
    use rust_decimal_macros::dec;

    fn ugx(amount: rust_decimal::Decimal) -> Money {
        Money::positive(amount, Currency::Ugx).unwrap()
    }

    fn request(admins: u8) -> ApprovalRequest {
        ApprovalRequest::new(
            7,
            RequestKind::Payment,
            Department::Store,
            UserId::from("kato"),
            ugx(dec!(1200000)),
            None,
            admins,
            Utc::now(),
        )
    }

    fn finance() -> Actor {
        Actor::new("amina", Department::Finance, Role::Finance)
    }

    fn admin(id: &str) -> Actor {
        Actor::new(id, Department::Admin, Role::Admin)
    }

    #[test]
    fn test_full_approval_chain() {
        let mut req = request(2);
        assert_eq!(req.awaiting_stage(), Some(ApprovalStage::Finance));

        assert_eq!(req.approve(&finance(), Utc::now()).unwrap(), ApprovalStage::Finance);
        assert_eq!(req.status, RequestStatus::FinanceApproved);

        assert_eq!(req.approve(&admin("okello"), Utc::now()).unwrap(), ApprovalStage::Admin1);
        assert_eq!(req.status, RequestStatus::Admin1Approved);

        assert_eq!(req.approve(&admin("byaruhanga"), Utc::now()).unwrap(), ApprovalStage::Admin2);
        assert_eq!(req.status, RequestStatus::FullyApproved);
        assert_eq!(req.awaiting_stage(), None);
    }

    #[test]
    fn test_single_admin_policy_skips_admin2() {
        let mut req = request(1);
        req.approve(&finance(), Utc::now()).unwrap();
        req.approve(&admin("okello"), Utc::now()).unwrap();
        assert_eq!(req.status, RequestStatus::FullyApproved);
        assert!(req.admin_approval_2.is_none());
    }

    #[test]
    fn test_same_admin_cannot_sign_both_admin_stages() {
        let mut req = request(2);
        req.approve(&finance(), Utc::now()).unwrap();
        req.approve(&admin("okello"), Utc::now()).unwrap();

        let err = req.approve(&admin("okello"), Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::ApprovalDenied(DenialReason::AlreadyApproved(ApprovalStage::Admin1))
        ));
        assert_eq!(req.status, RequestStatus::Admin1Approved);
    }

    #[test]
    fn test_rejection_is_terminal() {
        let mut req = request(2);
        req.approve(&finance(), Utc::now()).unwrap();
        req.reject(&admin("okello"), "Supplier not on approved list", Utc::now())
            .unwrap();

        assert_eq!(req.status, RequestStatus::Rejected);
        let rejection = req.rejection.as_ref().unwrap();
        assert_eq!(rejection.stage, ApprovalStage::Admin1);

        assert!(req.approve(&admin("byaruhanga"), Utc::now()).is_err());
        assert!(matches!(
            req.reject(&admin("byaruhanga"), "again", Utc::now()),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_fully_approved_request_cannot_be_rejected() {
        let mut req = request(1);
        req.approve(&finance(), Utc::now()).unwrap();
        req.approve(&admin("okello"), Utc::now()).unwrap();
        assert_eq!(req.status, RequestStatus::FullyApproved);

        assert!(matches!(
            req.reject(&admin("byaruhanga"), "Budget frozen", Utc::now()),
            Err(WorkflowError::InvalidTransition {
                status: RequestStatus::FullyApproved,
                action: "reject",
            })
        ));
        assert!(req.rejection.is_none());
    }

    #[test]
    fn test_admin_cannot_reject_at_finance_stage() {
        let mut req = request(2);
        assert!(matches!(
            req.reject(&admin("okello"), "Not needed", Utc::now()),
            Err(WorkflowError::Unauthorized(_))
        ));
        assert_eq!(req.status, RequestStatus::Pending);
    }

    #[test]
    fn test_reject_requires_reason_and_role() {
        let mut req = request(2);
        assert!(matches!(
            req.reject(&finance(), "  ", Utc::now()),
            Err(WorkflowError::Validation(_))
        ));

        let clerk = Actor::new("wasswa", Department::Store, Role::Staff);
        assert!(matches!(
            req.reject(&clerk, "no budget", Utc::now()),
            Err(WorkflowError::Unauthorized(_))
        ));

        let requestor = Actor::new("kato", Department::Store, Role::Admin);
        assert!(matches!(
            req.reject(&requestor, "changed my mind", Utc::now()),
            Err(WorkflowError::Unauthorized(_))
        ));
        assert_eq!(req.status, RequestStatus::Pending);
    }

    #[test]
    fn test_partial_settlement() {
        let mut req = request(1);
        req.approve(&finance(), Utc::now()).unwrap();
        req.approve(&admin("okello"), Utc::now()).unwrap();

        req.settle(ugx(dec!(200000))).unwrap();
        assert_eq!(req.status, RequestStatus::FullyApproved);
        assert_eq!(req.outstanding().unwrap().amount(), dec!(1000000));

        assert!(req.settle(ugx(dec!(1000001))).is_err());
        assert_eq!(req.paid.amount(), dec!(200000));

        req.settle(ugx(dec!(1000000))).unwrap();
        assert_eq!(req.status, RequestStatus::Paid);
    }
}
