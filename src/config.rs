use crate::domain::approval::ApprovalPolicy;
use crate::domain::money::Currency;
use rust_decimal::Decimal;

/// Settings the workflow engine runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Currency every request and cash float is kept in.
    pub currency: Currency,
    pub policy: ApprovalPolicy,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            currency: Currency::Ugx,
            policy: ApprovalPolicy::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            ..Self::default()
        }
    }

    pub fn with_dual_admin_threshold(mut self, threshold: Option<Decimal>) -> Self {
        self.policy.dual_admin_threshold = threshold;
        self
    }
}
