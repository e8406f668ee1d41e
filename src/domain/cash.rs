use super::actor::{Department, UserId};
use super::money::{Currency, Money};
use super::request::RequestId;
use crate::error::{Result, WorkflowError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Settles on the spot.
    Cash,
    /// Needs an admin to confirm the transfer before the request is paid.
    Bank,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => f.write_str("cash"),
            Self::Bank => f.write_str("bank"),
        }
    }
}

/// Cash float held by one department.
///
/// The available amount never goes below zero: [`CashBalance::debit`] refuses
/// any withdrawal the float cannot cover and leaves the balance untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashBalance {
    pub department: Department,
    pub available: Money,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CashBalance {
    pub fn new(department: Department, currency: Currency) -> Self {
        Self {
            department,
            available: Money::zero(currency),
            updated_at: None,
        }
    }

    pub fn credit(&mut self, amount: Money, at: DateTime<Utc>) -> Result<()> {
        self.available = self.available.checked_add(amount)?;
        self.updated_at = Some(at);
        Ok(())
    }

    pub fn debit(&mut self, amount: Money, at: DateTime<Utc>) -> Result<()> {
        if !self.available.covers(&amount)? {
            return Err(WorkflowError::InsufficientFunds {
                available: self.available.amount(),
                required: amount.amount(),
                currency: amount.currency(),
            });
        }
        self.available = self.available.checked_sub(amount)?;
        self.updated_at = Some(at);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debit => f.write_str("debit"),
            Self::Credit => f.write_str("credit"),
        }
    }
}

/// One movement on a department's cash float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub department: Department,
    pub direction: Direction,
    pub amount: Money,
    pub balance_after: Money,
    pub request: Option<RequestId>,
    pub method: Option<PaymentMethod>,
    pub note: Option<String>,
    pub recorded_by: UserId,
    pub recorded_at: DateTime<Utc>,
}
