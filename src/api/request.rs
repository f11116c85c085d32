//! Request types for the Renewal Workflow Engine API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The body of every batch action: the selected renewal ids plus the
/// optional action flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// The renewal ids the operator selected.
    pub ids: Vec<String>,
    /// For first-call: 1 dispatches the notices, 0 only marks the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send: Option<u8>,
    /// For invoice: 1 creates invoices in the external system, 0 only
    /// marks the billing step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<u8>,
}

/// Query parameters of the log listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQueryParams {
    /// Match entries for one task.
    pub task_id: Option<String>,
    /// Match entries of one batch.
    pub job_id: Option<u64>,
    /// Match entries written by one user.
    pub user: Option<String>,
    /// Match entries written at or after this instant (RFC 3339).
    pub since: Option<DateTime<Utc>>,
    /// Match entries written before this instant (RFC 3339).
    pub until: Option<DateTime<Utc>>,
}
