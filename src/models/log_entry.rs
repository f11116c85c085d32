//! Audit log models.
//!
//! Every state transition applied by a batch operation is recorded as a
//! [`RenewalLogEntry`]. Entries are append-only: never updated or deleted,
//! and the `job_id` grouping all rows of one operator action strictly
//! increases across the trail's lifetime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{InvoiceStep, LifecycleStep};

/// One append-only audit record of a renewal state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalLogEntry {
    /// The renewal task this entry concerns.
    pub task_id: String,
    /// Groups all entries created by one batch operation.
    pub job_id: u64,
    /// The lifecycle step before the transition.
    pub from_step: LifecycleStep,
    /// The lifecycle step after the transition.
    pub to_step: LifecycleStep,
    /// The invoice step before the transition, when that axis moved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_invoice: Option<InvoiceStep>,
    /// The invoice step after the transition, when that axis moved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_invoice: Option<InvoiceStep>,
    /// The grace flag before the transition, when it moved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_grace: Option<bool>,
    /// The grace flag after the transition, when it moved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_grace: Option<bool>,
    /// The done flag before the transition, when it moved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_done: Option<bool>,
    /// The done flag after the transition, when it moved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_done: Option<bool>,
    /// The acting user, threaded explicitly from the boundary.
    pub user: String,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}
