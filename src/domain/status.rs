//! Display classification of requests.

use super::request::{ApprovalRequest, RequestStatus};
use serde::Serialize;
use std::fmt;

/// Label shown to users for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusLabel {
    #[serde(rename = "Pending Finance")]
    PendingFinance,
    #[serde(rename = "Needs Admin")]
    NeedsAdmin,
    #[serde(rename = "Fully Approved")]
    FullyApproved,
    Processing,
    Paid,
    Rejected,
}

impl StatusLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingFinance => "Pending Finance",
            Self::NeedsAdmin => "Needs Admin",
            Self::FullyApproved => "Fully Approved",
            Self::Processing => "Processing",
            Self::Paid => "Paid",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finance work queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBucket {
    Pending,
    Processing,
    Rejected,
    Completed,
}

impl fmt::Display for QueueBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Processing => f.write_str("processing"),
            Self::Rejected => f.write_str("rejected"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

pub fn classify(request: &ApprovalRequest) -> StatusLabel {
    // Rejection metadata wins over whatever status flag is stored.
    if request.rejection.is_some() {
        return StatusLabel::Rejected;
    }
    match request.status {
        RequestStatus::Pending => StatusLabel::PendingFinance,
        RequestStatus::FinanceApproved | RequestStatus::Admin1Approved => StatusLabel::NeedsAdmin,
        RequestStatus::FullyApproved => StatusLabel::FullyApproved,
        RequestStatus::Processing => StatusLabel::Processing,
        RequestStatus::Paid => StatusLabel::Paid,
        RequestStatus::Rejected => StatusLabel::Rejected,
    }
}

/// Sorts a request into the pending → processing → rejected → completed
/// queues used by the finance desk.
pub fn queue_bucket(request: &ApprovalRequest) -> QueueBucket {
    match classify(request) {
        StatusLabel::PendingFinance | StatusLabel::NeedsAdmin => QueueBucket::Pending,
        StatusLabel::FullyApproved | StatusLabel::Processing => QueueBucket::Processing,
        StatusLabel::Rejected => QueueBucket::Rejected,
        StatusLabel::Paid => QueueBucket::Completed,
    }
}
