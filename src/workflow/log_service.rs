//! Append-only audit-trail writer and read-side filtering.
//!
//! Every operator batch gets one fresh job id, and one log row is written
//! per affected task under that id, so an auditor can reconstruct exactly
//! which batch action caused which change. The trail is a dumb, fast sink:
//! entries are never validated beyond their required fields, never updated
//! and never deleted.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::models::{RenewalLogEntry, RenewalTask};

/// Builds a log entry capturing a task's pre-transition state.
///
/// The entry starts as a no-op (`to_step == from_step`, all optional axes
/// unset); the caller records the transition by setting the `to_*` fields
/// it moved.
pub fn entry_for(task: &RenewalTask, job_id: u64, user: &str) -> RenewalLogEntry {
    RenewalLogEntry {
        task_id: task.id.clone(),
        job_id,
        from_step: task.step,
        to_step: task.step,
        from_invoice: None,
        to_invoice: None,
        from_grace: None,
        to_grace: None,
        from_done: None,
        to_done: None,
        user: user.to_string(),
        created_at: Utc::now(),
    }
}

/// Read-side filter over the audit trail.
///
/// All criteria are optional and combined with AND. This is the whole of
/// the log-filtering surface; presentation stays at the boundary.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    /// Match entries for one task.
    pub task_id: Option<String>,
    /// Match entries of one batch.
    pub job_id: Option<u64>,
    /// Match entries written by one user.
    pub user: Option<String>,
    /// Match entries written at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Match entries written before this instant.
    pub until: Option<DateTime<Utc>>,
}

impl LogQuery {
    fn matches(&self, entry: &RenewalLogEntry) -> bool {
        self.task_id.as_deref().is_none_or(|id| entry.task_id == id)
            && self.job_id.is_none_or(|id| entry.job_id == id)
            && self.user.as_deref().is_none_or(|u| entry.user == u)
            && self.since.is_none_or(|t| entry.created_at >= t)
            && self.until.is_none_or(|t| entry.created_at < t)
    }
}

/// The append-only audit trail with monotonically increasing job ids.
///
/// Job ids are allocated from an atomic counter seeded with
/// `max(existing) + 1`, which keeps the historical `max()+1` contract
/// while making in-process concurrent batches safe.
#[derive(Debug)]
pub struct LogService {
    entries: Mutex<Vec<RenewalLogEntry>>,
    next_job_id: AtomicU64,
}

impl LogService {
    /// Creates an empty trail; the first batch gets job id 1.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_job_id: AtomicU64::new(1),
        }
    }

    /// Restores a trail from existing entries, seeding the counter at
    /// `max(job_id) + 1`.
    pub fn with_entries(entries: Vec<RenewalLogEntry>) -> Self {
        let next = entries.iter().map(|e| e.job_id).max().unwrap_or(0) + 1;
        Self {
            entries: Mutex::new(entries),
            next_job_id: AtomicU64::new(next),
        }
    }

    /// Allocates a fresh job id for one batch operation.
    pub fn create_job_id(&self) -> u64 {
        self.next_job_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Bulk-appends pre-built log rows.
    pub fn append(&self, new_entries: Vec<RenewalLogEntry>) {
        let mut entries = self.entries.lock().expect("log mutex poisoned");
        entries.extend(new_entries);
    }

    /// Returns a snapshot of the whole trail.
    pub fn entries(&self) -> Vec<RenewalLogEntry> {
        self.entries.lock().expect("log mutex poisoned").clone()
    }

    /// Returns a snapshot of the entries matching a query.
    pub fn filter(&self, query: &LogQuery) -> Vec<RenewalLogEntry> {
        self.entries
            .lock()
            .expect("log mutex poisoned")
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect()
    }
}

impl Default for LogService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceStep, LifecycleStep};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn task(id: &str) -> RenewalTask {
        RenewalTask {
            id: id.to_string(),
            matter_id: "mat_001".to_string(),
            event_id: "evt_001".to_string(),
            detail: 5,
            due_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            done: false,
            done_date: None,
            step: LifecycleStep::Pending,
            grace_period: false,
            invoice_step: InvoiceStep::None,
            cost: Decimal::ZERO,
            fee: Decimal::ZERO,
            discount: Decimal::ZERO,
            sme_status: false,
            table_fee: false,
        }
    }

    #[test]
    fn test_first_job_id_is_one() {
        let log = LogService::new();
        assert_eq!(log.create_job_id(), 1);
        assert_eq!(log.create_job_id(), 2);
    }

    #[test]
    fn test_counter_seeds_from_existing_max() {
        let mut entry = entry_for(&task("ren_001"), 41, "operator");
        entry.to_step = LifecycleStep::FirstCall;
        let log = LogService::with_entries(vec![entry]);
        assert_eq!(log.create_job_id(), 42);
    }

    #[test]
    fn test_entry_for_captures_pre_state() {
        let t = task("ren_001");
        let entry = entry_for(&t, 7, "operator");
        assert_eq!(entry.from_step, LifecycleStep::Pending);
        assert_eq!(entry.to_step, LifecycleStep::Pending);
        assert_eq!(entry.job_id, 7);
        assert_eq!(entry.user, "operator");
        assert!(entry.from_invoice.is_none());
    }

    #[test]
    fn test_filter_by_task_and_job() {
        let log = LogService::new();
        let job = log.create_job_id();
        log.append(vec![
            entry_for(&task("ren_001"), job, "operator"),
            entry_for(&task("ren_002"), job, "operator"),
        ]);

        let query = LogQuery {
            task_id: Some("ren_001".to_string()),
            ..LogQuery::default()
        };
        assert_eq!(log.filter(&query).len(), 1);

        let query = LogQuery {
            job_id: Some(job),
            ..LogQuery::default()
        };
        assert_eq!(log.filter(&query).len(), 2);
    }

    #[test]
    fn test_filter_by_user() {
        let log = LogService::new();
        let job = log.create_job_id();
        log.append(vec![entry_for(&task("ren_001"), job, "alice")]);

        let query = LogQuery {
            user: Some("bob".to_string()),
            ..LogQuery::default()
        };
        assert!(log.filter(&query).is_empty());
    }
}
