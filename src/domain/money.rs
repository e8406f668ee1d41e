use crate::error::{Result, WorkflowError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies the trading desks settle in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Uganda shilling, no minor unit.
    Ugx,
    Usd,
}

impl Currency {
    /// Number of decimal places an amount in this currency may carry.
    pub fn precision(self) -> u32 {
        match self {
            Self::Ugx => 0,
            Self::Usd => 2,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Ugx => "UGX",
            Self::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UGX" => Ok(Self::Ugx),
            "USD" => Ok(Self::Usd),
            other => Err(WorkflowError::Validation(format!(
                "unsupported currency '{other}'"
            ))),
        }
    }
}

/// A non-negative monetary value in a single currency.
///
/// Construction never rounds: a value carrying more decimal places than the
/// currency allows is rejected instead of being truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self> {
        let amount = amount.normalize();
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(WorkflowError::Validation(
                "Amount must not be negative".to_string(),
            ));
        }
        if amount.scale() > currency.precision() {
            return Err(WorkflowError::Validation(format!(
                "{amount} has more than {} decimal places for {currency}",
                currency.precision()
            )));
        }
        // -0 normalizes to a signed zero; store the canonical one.
        let amount = if amount.is_zero() { Decimal::ZERO } else { amount };
        Ok(Self { amount, currency })
    }

    /// Like [`Money::new`], but also rejects zero. Used for transaction amounts.
    pub fn positive(amount: Decimal, currency: Currency) -> Result<Self> {
        let money = Self::new(amount, currency)?;
        if money.is_zero() {
            return Err(WorkflowError::Validation(
                "Amount must be positive".to_string(),
            ));
        }
        Ok(money)
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn ensure_currency(&self, expected: Currency) -> Result<()> {
        if self.currency == expected {
            Ok(())
        } else {
            Err(WorkflowError::CurrencyMismatch {
                expected,
                found: self.currency,
            })
        }
    }

    pub fn checked_add(self, rhs: Money) -> Result<Money> {
        rhs.ensure_currency(self.currency)?;
        let amount = self
            .amount
            .checked_add(rhs.amount)
            .ok_or_else(|| WorkflowError::Validation("Amount overflow".to_string()))?;
        Money::new(amount, self.currency)
    }

    /// Subtracts `rhs`, failing when the result would go below zero.
    pub fn checked_sub(self, rhs: Money) -> Result<Money> {
        rhs.ensure_currency(self.currency)?;
        if rhs.amount > self.amount {
            return Err(WorkflowError::Validation(format!(
                "cannot subtract {rhs} from {self}"
            )));
        }
        Money::new(self.amount - rhs.amount, self.currency)
    }

    /// Whether this amount is at least `other`. Both must share a currency.
    pub fn covers(&self, other: &Money) -> Result<bool> {
        other.ensure_currency(self.currency)?;
        Ok(self.amount >= other.amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
