//! Fee calculation for the Renewal Workflow Engine.
//!
//! Pure functions computing the cost/fee amounts owed for a renewal from
//! either a fee-schedule entry or the task's own defaults, applying the
//! discount, SME-reduction, grace-surcharge and VAT rules, plus the
//! locale-aware money formatting used in client notices. No I/O.

mod calculator;
mod discount;
mod format;
mod grace;
mod vat;

pub use calculator::{FeeAmounts, calculate};
pub use discount::{apply_discount, apply_discount_above};
pub use format::format_amount;
pub use grace::{apply_late_surcharge, paid_late};
pub use vat::{vat_amount, vat_rate_for, vat_rate_for_tax_id};
