//! Approval stages and the separation-of-duties guard.
//!
//! A request climbs finance → admin1 → admin2. Every approval is checked by
//! [`check_separation_of_duties`], a pure read over the request flags.

use super::actor::{Actor, Role, UserId};
use super::money::Money;
use super::request::{ApprovalRequest, RequestStatus};
use crate::error::{Result, WorkflowError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStage {
    Finance,
    Admin1,
    Admin2,
}

impl ApprovalStage {
    pub fn required_role(self) -> Role {
        match self {
            Self::Finance => Role::Finance,
            Self::Admin1 | Self::Admin2 => Role::Admin,
        }
    }

    /// Whether a user holding `role` may sign off this stage.
    pub fn permits(self, role: Role) -> bool {
        role == self.required_role()
    }
}

impl fmt::Display for ApprovalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::Finance => "finance",
            Self::Admin1 => "admin1",
            Self::Admin2 => "admin2",
        };
        f.write_str(stage)
    }
}

/// Sign-off recorded against one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub by: UserId,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenialReason {
    #[error("requestor cannot approve their own request")]
    SelfApproval,
    #[error("user already approved this request at the {0} stage")]
    AlreadyApproved(ApprovalStage),
    #[error("request is {0} and not awaiting approval")]
    NotAwaitingApproval(RequestStatus),
    #[error("{stage} stage requires the {required} role")]
    MissingRole {
        stage: ApprovalStage,
        required: Role,
    },
}

/// Outcome of the separation-of-duties guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalCheck {
    Allowed(ApprovalStage),
    Denied(DenialReason),
}

impl ApprovalCheck {
    pub fn can_approve(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    pub fn reason(&self) -> Option<&DenialReason> {
        match self {
            Self::Allowed(_) => None,
            Self::Denied(reason) => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<ApprovalStage> {
        match self {
            Self::Allowed(stage) => Ok(stage),
            Self::Denied(reason) => Err(WorkflowError::ApprovalDenied(reason)),
        }
    }
}

/// Checks whether `actor` may approve `request` at its current stage.
///
/// The requestor is refused at every stage, including terminal ones, before
/// any other rule is consulted.
pub fn check_separation_of_duties(request: &ApprovalRequest, actor: &Actor) -> ApprovalCheck {
    if request.requested_by == actor.id {
        return ApprovalCheck::Denied(DenialReason::SelfApproval);
    }

    let Some(stage) = request.awaiting_stage() else {
        return ApprovalCheck::Denied(DenialReason::NotAwaitingApproval(request.status));
    };

    if let Some(previous) = request.approved_stage_of(&actor.id) {
        return ApprovalCheck::Denied(DenialReason::AlreadyApproved(previous));
    }

    if !stage.permits(actor.role) {
        return ApprovalCheck::Denied(DenialReason::MissingRole {
            stage,
            required: stage.required_role(),
        });
    }

    ApprovalCheck::Allowed(stage)
}

/// Decides how many admin sign-offs a request needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApprovalPolicy {
    /// Requests strictly below this amount need a single admin approval.
    /// `None` keeps the full two-admin chain for everything.
    pub dual_admin_threshold: Option<Decimal>,
}

impl ApprovalPolicy {
    pub fn admin_approvals_required(&self, amount: &Money) -> u8 {
        match self.dual_admin_threshold {
            Some(threshold) if amount.amount() < threshold => 1,
            _ => 2,
        }
    }
}
