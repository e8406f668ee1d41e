use super::actor::{Actor, Department, UserId};
use super::request::RequestId;
use crate::error::{Result, WorkflowError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ModificationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationStatus {
    Pending,
    Completed,
}

impl fmt::Display for ModificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// A request kicked back to a department for changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationRequest {
    pub id: ModificationId,
    pub original_payment_id: RequestId,
    pub target_department: Department,
    pub reason: String,
    pub comments: Option<String>,
    pub status: ModificationStatus,
    pub requested_by: UserId,
    pub created_at: DateTime<Utc>,
    pub completed_by: Option<UserId>,
    pub completed_at: Option<DateTime<Utc>>,
    pub forwarded_from: Option<ModificationId>,
    pub forwarded_to: Option<ModificationId>,
}

impl ModificationRequest {
    pub fn new(
        id: ModificationId,
        original_payment_id: RequestId,
        target_department: Department,
        reason: &str,
        comments: Option<String>,
        requested_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::Validation(
                "A modification reason is required".to_string(),
            ));
        }
        Ok(Self {
            id,
            original_payment_id,
            target_department,
            reason: reason.to_string(),
            comments: comments.filter(|c| !c.trim().is_empty()),
            status: ModificationStatus::Pending,
            requested_by,
            created_at,
            completed_by: None,
            completed_at: None,
            forwarded_from: None,
            forwarded_to: None,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == ModificationStatus::Completed
    }

    /// Whether `actor` may act on this modification.
    pub fn can_be_handled_by(&self, actor: &Actor) -> bool {
        actor.is_admin() || actor.department == self.target_department
    }

    /// Closes the modification. Returns `false` when it was already closed.
    pub fn complete(&mut self, actor: &Actor, at: DateTime<Utc>) -> bool {
        if self.is_completed() {
            return false;
        }
        self.status = ModificationStatus::Completed;
        self.completed_by = Some(actor.id.clone());
        self.completed_at = Some(at);
        true
    }

    /// Builds the follow-up record addressed to `target`, carrying this
    /// modification's reason along as free text.
    pub fn forwarded(
        &self,
        id: ModificationId,
        target: Department,
        reason: &str,
        comments: Option<String>,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<Self> {
        let reason = reason.trim();
        let carried = if reason.is_empty() {
            format!("Forwarded from {}: {}", self.target_department, self.reason)
        } else {
            format!(
                "{reason} (forwarded from {}: {})",
                self.target_department, self.reason
            )
        };
        let mut next = Self::new(
            id,
            self.original_payment_id,
            target,
            &carried,
            comments,
            actor.id.clone(),
            at,
        )?;
        next.forwarded_from = Some(self.id);
        Ok(next)
    }
}
