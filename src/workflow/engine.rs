//! The renewal state machine.
//!
//! Validates and applies lifecycle, invoice-step and grace transitions to
//! batches of renewal tasks. Batch semantics are best-effort: unknown task
//! ids are skipped, never errors, and the outcome reports the updated
//! count next to the skipped ids so the non-atomic contract stays visible.
//! Every batch call allocates exactly one fresh job id and writes one log
//! row per affected task under it.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{CaseEvent, EventKind, InvoiceStep, LifecycleStep, RenewalLogEntry, RenewalTask};
use crate::store::Repository;

use super::log_service::{LogService, entry_for};

/// The result of one best-effort batch transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// The job id grouping this batch's log rows.
    pub job_id: u64,
    /// How many tasks were found and updated.
    pub updated: usize,
    /// The ids that matched no task and were silently skipped.
    pub skipped: Vec<String>,
}

/// Drives renewal tasks through their lifecycle.
///
/// All operations take the explicit acting user and an id batch; an empty
/// batch is a caller error (`EmptySelection`), every other per-item
/// failure is swallowed into the skipped list.
#[derive(Debug, Clone)]
pub struct WorkflowEngine {
    log: Arc<LogService>,
}

impl WorkflowEngine {
    /// Creates an engine writing to the given audit trail.
    pub fn new(log: Arc<LogService>) -> Self {
        Self { log }
    }

    /// Marks the batch as notified (step FIRST_CALL).
    pub fn mark_first_call(
        &self,
        repo: &mut Repository,
        ids: &[String],
        actor: &str,
    ) -> EngineResult<BatchOutcome> {
        self.apply(repo, ids, actor, "first_call", |task, entry| {
            task.step = LifecycleStep::FirstCall;
            entry.to_step = task.step;
        })
    }

    /// Flags the batch as having entered the grace period.
    pub fn mark_grace_period(
        &self,
        repo: &mut Repository,
        ids: &[String],
        actor: &str,
    ) -> EngineResult<BatchOutcome> {
        self.apply(repo, ids, actor, "grace_period", |task, entry| {
            entry.from_grace = Some(task.grace_period);
            task.grace_period = true;
            entry.to_grace = Some(true);
        })
    }

    /// Moves the batch to TO_PAY and opens the billing axis
    /// (invoice step NONE → TO_INVOICE); both axes are logged.
    pub fn mark_to_pay(
        &self,
        repo: &mut Repository,
        ids: &[String],
        actor: &str,
    ) -> EngineResult<BatchOutcome> {
        self.apply(repo, ids, actor, "to_pay", |task, entry| {
            entry.from_invoice = Some(task.invoice_step);
            task.step = LifecycleStep::ToPay;
            task.invoice_step = InvoiceStep::ToInvoice;
            entry.to_step = task.step;
            entry.to_invoice = Some(task.invoice_step);
        })
    }

    /// Marks the batch as invoiced in the external system.
    pub fn mark_invoiced(
        &self,
        repo: &mut Repository,
        ids: &[String],
        actor: &str,
    ) -> EngineResult<BatchOutcome> {
        self.apply(repo, ids, actor, "invoiced", |task, entry| {
            entry.from_invoice = Some(task.invoice_step);
            task.invoice_step = InvoiceStep::Invoiced;
            entry.to_invoice = Some(task.invoice_step);
        })
    }

    /// Marks the batch's invoices as settled by the client.
    pub fn mark_paid(
        &self,
        repo: &mut Repository,
        ids: &[String],
        actor: &str,
    ) -> EngineResult<BatchOutcome> {
        self.apply(repo, ids, actor, "paid", |task, entry| {
            entry.from_invoice = Some(task.invoice_step);
            task.invoice_step = InvoiceStep::Paid;
            entry.to_invoice = Some(task.invoice_step);
        })
    }

    /// Records payment of the official fee: done, dated today, step
    /// CLEARED. Re-applying refreshes the done date; there is no
    /// idempotence guard.
    pub fn mark_done(
        &self,
        repo: &mut Repository,
        ids: &[String],
        actor: &str,
    ) -> EngineResult<BatchOutcome> {
        let today = Utc::now().date_naive();
        self.apply(repo, ids, actor, "done", |task, entry| {
            entry.from_done = Some(task.done);
            task.done = true;
            task.done_date = Some(today);
            task.step = LifecycleStep::Cleared;
            entry.to_step = task.step;
            entry.to_done = Some(true);
        })
    }

    /// Records receipt of the official payment confirmation.
    pub fn mark_receipt(
        &self,
        repo: &mut Repository,
        ids: &[String],
        actor: &str,
    ) -> EngineResult<BatchOutcome> {
        self.apply(repo, ids, actor, "receipt", |task, entry| {
            task.step = LifecycleStep::Receipt;
            entry.to_step = task.step;
        })
    }

    /// Closes the batch: a task already done goes to the terminal DONE
    /// step, anything else to CLOSED.
    pub fn mark_closed(
        &self,
        repo: &mut Repository,
        ids: &[String],
        actor: &str,
    ) -> EngineResult<BatchOutcome> {
        self.apply(repo, ids, actor, "closed", |task, entry| {
            entry.from_done = Some(task.done);
            task.step = if task.done {
                LifecycleStep::Done
            } else {
                LifecycleStep::Closed
            };
            entry.to_step = task.step;
            entry.to_done = Some(true);
        })
    }

    /// Marks the batch abandoned and appends an abandoned event, dated
    /// today, on each owning matter.
    pub fn mark_abandoned(
        &self,
        repo: &mut Repository,
        ids: &[String],
        actor: &str,
    ) -> EngineResult<BatchOutcome> {
        let outcome = self.apply(repo, ids, actor, "abandoned", |task, entry| {
            entry.from_done = Some(task.done);
            task.step = LifecycleStep::Abandoned;
            entry.to_step = task.step;
            entry.to_done = Some(true);
        })?;
        self.record_case_events(repo, ids, &outcome.skipped, EventKind::Abandoned);
        Ok(outcome)
    }

    /// Marks the batch lapsed and appends a lapsed event, dated today,
    /// on each owning matter.
    pub fn mark_lapsed(
        &self,
        repo: &mut Repository,
        ids: &[String],
        actor: &str,
    ) -> EngineResult<BatchOutcome> {
        let outcome = self.apply(repo, ids, actor, "lapsed", |task, entry| {
            task.step = LifecycleStep::Lapsed;
            entry.to_step = task.step;
        })?;
        self.record_case_events(repo, ids, &outcome.skipped, EventKind::Lapsed);
        Ok(outcome)
    }

    /// Applies one mutation across a batch: one job id, one log row per
    /// found task carrying its pre-transition state, skipped ids swallowed.
    fn apply<F>(
        &self,
        repo: &mut Repository,
        ids: &[String],
        actor: &str,
        operation: &'static str,
        mut mutate: F,
    ) -> EngineResult<BatchOutcome>
    where
        F: FnMut(&mut RenewalTask, &mut RenewalLogEntry),
    {
        if ids.is_empty() {
            return Err(EngineError::EmptySelection);
        }

        let job_id = self.log.create_job_id();
        let mut entries = Vec::with_capacity(ids.len());
        let mut skipped = Vec::new();

        for id in ids {
            match repo.task_mut(id) {
                Some(task) => {
                    let mut entry = entry_for(task, job_id, actor);
                    mutate(task, &mut entry);
                    entries.push(entry);
                }
                None => skipped.push(id.clone()),
            }
        }

        let updated = entries.len();
        self.log.append(entries);

        info!(
            operation,
            job_id,
            updated,
            skipped = skipped.len(),
            "batch transition applied"
        );

        Ok(BatchOutcome {
            job_id,
            updated,
            skipped,
        })
    }

    /// Appends one case event per updated task on its owning matter.
    fn record_case_events(
        &self,
        repo: &mut Repository,
        ids: &[String],
        skipped: &[String],
        kind: EventKind,
    ) {
        let today = Utc::now().date_naive();
        for id in ids {
            if skipped.contains(id) {
                continue;
            }
            let Some(matter_id) = repo.task(id).map(|t| t.matter_id.clone()) else {
                continue;
            };
            if let Some(matter) = repo.matter_mut(&matter_id) {
                matter.events.push(CaseEvent { kind, date: today });
            }
        }
    }
}
