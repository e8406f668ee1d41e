//! Final-state reports written by the binary.

use crate::application::engine::WorkflowEngine;
use crate::domain::actor::{Department, UserId};
use crate::domain::cash::{CashBalance, Direction, LedgerEntry, PaymentMethod};
use crate::domain::modification::{ModificationRequest, ModificationStatus};
use crate::domain::money::Currency;
use crate::domain::request::{ApprovalRequest, RequestKind, RequestStatus};
use crate::domain::status::{QueueBucket, StatusLabel, classify, queue_bucket};
use crate::error::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Report {
    #[default]
    Requests,
    Balances,
    Ledger,
    Modifications,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Serialize)]
pub struct RequestRow {
    pub request: u64,
    pub kind: RequestKind,
    pub department: Department,
    pub requested_by: UserId,
    pub currency: Currency,
    pub amount: Decimal,
    pub paid: Decimal,
    pub status: RequestStatus,
    pub label: StatusLabel,
    pub queue: QueueBucket,
}

impl From<&ApprovalRequest> for RequestRow {
    fn from(request: &ApprovalRequest) -> Self {
        Self {
            request: request.id,
            kind: request.kind,
            department: request.department,
            requested_by: request.requested_by.clone(),
            currency: request.amount.currency(),
            amount: request.amount.amount(),
            paid: request.paid.amount(),
            status: request.status,
            label: classify(request),
            queue: queue_bucket(request),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceRow {
    pub department: Department,
    pub currency: Currency,
    pub available: Decimal,
}

impl From<&CashBalance> for BalanceRow {
    fn from(balance: &CashBalance) -> Self {
        Self {
            department: balance.department,
            currency: balance.available.currency(),
            available: balance.available.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerRow {
    pub entry: u64,
    pub department: Department,
    pub direction: Direction,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub request: Option<u64>,
    pub method: Option<PaymentMethod>,
    pub note: Option<String>,
    pub recorded_by: UserId,
    pub recorded_at: DateTime<Utc>,
}

impl From<&LedgerEntry> for LedgerRow {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            entry: entry.id,
            department: entry.department,
            direction: entry.direction,
            amount: entry.amount.amount(),
            balance_after: entry.balance_after.amount(),
            request: entry.request,
            method: entry.method,
            note: entry.note.clone(),
            recorded_by: entry.recorded_by.clone(),
            recorded_at: entry.recorded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModificationRow {
    pub modification: u64,
    pub original_payment_id: u64,
    pub target_department: Department,
    pub status: ModificationStatus,
    pub reason: String,
    pub comments: Option<String>,
    pub requested_by: UserId,
    pub forwarded_from: Option<u64>,
    pub forwarded_to: Option<u64>,
}

impl From<&ModificationRequest> for ModificationRow {
    fn from(m: &ModificationRequest) -> Self {
        Self {
            modification: m.id,
            original_payment_id: m.original_payment_id,
            target_department: m.target_department,
            status: m.status,
            reason: m.reason.clone(),
            comments: m.comments.clone(),
            requested_by: m.requested_by.clone(),
            forwarded_from: m.forwarded_from,
            forwarded_to: m.forwarded_to,
        }
    }
}

/// Writes report rows as CSV (with a header) or as a pretty JSON array.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: Format,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W, format: Format) -> Self {
        Self { writer, format }
    }

    pub fn write_rows<T: Serialize>(&mut self, rows: &[T]) -> Result<()> {
        match self.format {
            Format::Csv => {
                let mut csv = csv::Writer::from_writer(&mut self.writer);
                for row in rows {
                    csv.serialize(row)?;
                }
                csv.flush()?;
            }
            Format::Json => {
                serde_json::to_writer_pretty(&mut self.writer, rows)?;
                writeln!(self.writer)?;
            }
        }
        Ok(())
    }

    /// Renders `report` from the engine's current state.
    pub async fn write_report(&mut self, engine: &WorkflowEngine, report: Report) -> Result<()> {
        match report {
            Report::Requests => {
                let requests = engine.requests().await?;
                let rows: Vec<RequestRow> = requests.iter().map(Into::into).collect();
                self.write_rows(&rows)
            }
            Report::Balances => {
                let balances = engine.balances().await?;
                let rows: Vec<BalanceRow> = balances.iter().map(Into::into).collect();
                self.write_rows(&rows)
            }
            Report::Ledger => {
                let entries = engine.ledger().await?;
                let rows: Vec<LedgerRow> = entries.iter().map(Into::into).collect();
                self.write_rows(&rows)
            }
            Report::Modifications => {
                let modifications = engine.modifications().await?;
                let rows: Vec<ModificationRow> = modifications.iter().map(Into::into).collect();
                self.write_rows(&rows)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use rust_decimal_macros::dec;

    fn request() -> ApprovalRequest {
        ApprovalRequest::new(
            4,
            RequestKind::Expense,
            Department::Milling,
            UserId::from("kato"),
            Money::positive(dec!(1250000), Currency::Ugx).unwrap(),
            None,
            2,
            Utc::now(),
        )
    }

    #[test]
    fn test_csv_request_rows() {
        let mut out = Vec::new();
        let mut writer = ReportWriter::new(&mut out, Format::Csv);
        writer.write_rows(&[RequestRow::from(&request())]).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("request,kind,department,requested_by,currency,amount,paid,status,label,queue")
        );
        assert_eq!(
            lines.next(),
            Some("4,expense,milling,kato,UGX,1250000,0,pending,Pending Finance,pending")
        );
    }

    #[test]
    fn test_json_request_rows() {
        let mut out = Vec::new();
        let mut writer = ReportWriter::new(&mut out, Format::Json);
        writer.write_rows(&[RequestRow::from(&request())]).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["request"], 4);
        assert_eq!(value[0]["amount"], "1250000");
        assert_eq!(value[0]["label"], "Pending Finance");
    }
}
