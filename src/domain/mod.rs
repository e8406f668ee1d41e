//! Domain model of the approval workflow: requests, approvals, cash floats
//! and modification requests, plus the storage ports the application layer
//! depends on.

pub mod actor;
pub mod approval;
pub mod cash;
pub mod modification;
pub mod money;
pub mod ports;
pub mod request;
pub mod status;
