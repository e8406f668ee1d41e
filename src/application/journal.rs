//! Replaying a journal of workflow commands against the engine.

use super::engine::{Submission, WorkflowEngine};
use crate::domain::actor::{Department, Roster, UserId};
use crate::domain::cash::PaymentMethod;
use crate::domain::request::{RequestId, RequestKind};
use crate::error::{Result, WorkflowError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Submit,
    Approve,
    Reject,
    Pay,
    Confirm,
    Reverse,
    Deposit,
    Modify,
    Forward,
    Complete,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Pay => "pay",
            Self::Confirm => "confirm",
            Self::Reverse => "reverse",
            Self::Deposit => "deposit",
            Self::Modify => "modify",
            Self::Forward => "forward",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// One row of the journal.
///
/// `request` holds the request id, except for `forward` and `complete`
/// where it names the modification request.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct JournalEntry {
    pub command: Command,
    pub request: Option<u64>,
    pub actor: UserId,
    pub kind: Option<RequestKind>,
    pub amount: Option<Decimal>,
    pub method: Option<PaymentMethod>,
    pub department: Option<Department>,
    pub reason: Option<String>,
    pub comments: Option<String>,
}

impl JournalEntry {
    fn require<T: Clone>(&self, value: &Option<T>, field: &'static str) -> Result<T> {
        value.clone().ok_or_else(|| {
            WorkflowError::Validation(format!("{} requires the {field} column", self.command))
        })
    }

    fn request_id(&self) -> Result<RequestId> {
        self.require(&self.request, "request")
    }

    fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or_default()
    }
}

impl WorkflowEngine {
    /// Applies one journal row on behalf of its actor.
    pub async fn apply(&self, roster: &Roster, entry: JournalEntry) -> Result<()> {
        let actor = roster.resolve(&entry.actor)?;

        match entry.command {
            Command::Submit => {
                let submission = Submission {
                    id: entry.request_id()?,
                    kind: entry.kind.unwrap_or(RequestKind::Expense),
                    department: entry.department,
                    amount: entry.require(&entry.amount, "amount")?,
                    description: entry.reason.clone(),
                };
                self.submit_request(actor, submission).await?;
            }
            Command::Approve => {
                self.approve(entry.request_id()?, actor).await?;
            }
            Command::Reject => {
                self.reject(entry.request_id()?, actor, entry.reason())
                    .await?;
            }
            Command::Pay => {
                let method = entry.method.unwrap_or(PaymentMethod::Cash);
                self.process_payment(entry.request_id()?, actor, method, entry.amount)
                    .await?;
            }
            Command::Confirm => {
                self.confirm_bank_payment(entry.request_id()?, actor)
                    .await?;
            }
            Command::Reverse => {
                self.reverse_bank_payment(entry.request_id()?, actor, entry.reason())
                    .await?;
            }
            Command::Deposit => {
                let department = entry.department.unwrap_or(actor.department);
                let amount = entry.require(&entry.amount, "amount")?;
                self.deposit_cash(actor, department, amount, entry.reason.clone())
                    .await?;
            }
            Command::Modify => {
                let target = entry.require(&entry.department, "department")?;
                self.request_modification(
                    entry.request_id()?,
                    actor,
                    target,
                    entry.reason(),
                    entry.comments.clone(),
                )
                .await?;
            }
            Command::Forward => {
                let target = entry.require(&entry.department, "department")?;
                self.forward_modification(
                    entry.request_id()?,
                    actor,
                    target,
                    entry.reason(),
                    entry.comments.clone(),
                )
                .await?;
            }
            Command::Complete => {
                self.complete_modification(entry.request_id()?, actor)
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkflowConfig;
    use crate::domain::actor::{Actor, Role};
    use crate::domain::ports::Stores;
    use crate::domain::request::RequestStatus;
    use rust_decimal_macros::dec;

    fn roster() -> Roster {
        [
            Actor::new("kato", Department::Store, Role::Staff),
            Actor::new("amina", Department::Finance, Role::Finance),
            Actor::new("okello", Department::Admin, Role::Admin),
            Actor::new("byaruhanga", Department::Admin, Role::Admin),
        ]
        .into_iter()
        .collect()
    }

    fn entry(command: Command, request: Option<u64>, actor: &str) -> JournalEntry {
        JournalEntry {
            command,
            request,
            actor: UserId::from(actor),
            kind: None,
            amount: None,
            method: None,
            department: None,
            reason: None,
            comments: None,
        }
    }

    #[tokio::test]
    async fn test_apply_full_cycle() {
        let engine = WorkflowEngine::new(Stores::in_memory(), WorkflowConfig::default());
        let roster = roster();

        let deposit = JournalEntry {
            amount: Some(dec!(5000000)),
            ..entry(Command::Deposit, None, "amina")
        };
        let submit = JournalEntry {
            amount: Some(dec!(1500000)),
            kind: Some(RequestKind::Payment),
            ..entry(Command::Submit, Some(1), "kato")
        };

        for e in [
            deposit,
            submit,
            entry(Command::Approve, Some(1), "amina"),
            entry(Command::Approve, Some(1), "okello"),
            entry(Command::Approve, Some(1), "byaruhanga"),
            entry(Command::Pay, Some(1), "amina"),
        ] {
            engine.apply(&roster, e).await.unwrap();
        }

        assert_eq!(engine.request(1).await.unwrap().status, RequestStatus::Paid);
        assert_eq!(
            engine.balance(Department::Finance).await.unwrap().available.amount(),
            dec!(3500000)
        );
    }

    #[tokio::test]
    async fn test_apply_rejects_incomplete_rows() {
        let engine = WorkflowEngine::new(Stores::in_memory(), WorkflowConfig::default());
        let roster = roster();

        let err = engine
            .apply(&roster, entry(Command::Submit, Some(1), "kato"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: submit requires the amount column");

        assert!(matches!(
            engine.apply(&roster, entry(Command::Approve, None, "amina")).await,
            Err(WorkflowError::Validation(_))
        ));
        assert!(matches!(
            engine.apply(&roster, entry(Command::Approve, Some(1), "ghost")).await,
            Err(WorkflowError::UnknownUser(_))
        ));
    }
}
