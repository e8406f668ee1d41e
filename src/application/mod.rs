//! Application layer orchestrating the approval workflow.
//!
//! `WorkflowEngine` is the single entry point. Its operations are split by
//! concern: approvals live in `engine`, the cash side in `payments`, the
//! modification router in `modifications` and journal replay in `journal`.

pub mod engine;
pub mod journal;
pub mod modifications;
pub mod payments;
