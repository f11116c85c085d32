//! Grace-period late-payment surcharge.
//!
//! The surcharge multiplier applies to the service fee only when the task
//! is flagged as in grace *and* was actually paid after its due date.
//! A grace-flagged renewal paid on or before the due date is never
//! surcharged pre-emptively.

use rust_decimal::Decimal;

use crate::models::RenewalTask;

/// Returns true when the task was actually paid late inside grace.
pub fn paid_late(task: &RenewalTask) -> bool {
    task.grace_period && task.done_date.is_some_and(|done| done > task.due_date)
}

/// Applies the late-payment multiplier to a fee when warranted.
pub fn apply_late_surcharge(fee: Decimal, task: &RenewalTask, multiplier: Decimal) -> Decimal {
    if paid_late(task) { fee * multiplier } else { fee }
}
