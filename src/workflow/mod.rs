//! Workflow state machine and audit trail for renewal tasks.
//!
//! [`WorkflowEngine`] validates and applies batch transitions across the
//! lifecycle, invoice-step and grace axes; [`LogService`] records every
//! transition in an append-only trail grouped by job id.

mod engine;
mod log_service;

pub use engine::{BatchOutcome, WorkflowEngine};
pub use log_service::{LogQuery, LogService, entry_for};
