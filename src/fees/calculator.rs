//! Renewal fee calculation.
//!
//! Pure computation with no I/O: given a renewal task, an optional fee
//! schedule entry and the fee settings, produce the official cost and the
//! service fee the client owes. Never mutates its inputs.

use rust_decimal::Decimal;

use crate::config::FeeSettings;
use crate::models::{FeeScheduleEntry, RenewalTask};

use super::discount::{apply_discount, apply_discount_above};
use super::grace::apply_late_surcharge;

/// The cost/fee amounts owed for one renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeAmounts {
    /// The official (government) cost.
    pub cost: Decimal,
    /// The service fee, after discount and any late surcharge.
    pub fee: Decimal,
}

/// Computes the amounts owed for a renewal task.
///
/// When the task has a schedule entry (`table_fee`), the cost/fee pair is
/// selected from the entry's quadruplet by the grace and SME flags, and
/// the discount applies to the fee component only. Otherwise the task's
/// own amounts are used, with the discount scaling only the portion of
/// the fee above the configured default.
///
/// In both paths the grace late-payment multiplier is applied last, and
/// only when the task is in grace and was actually paid after its due
/// date.
///
/// # Arguments
///
/// * `task` - The renewal to price
/// * `entry` - The fee schedule entry for the task's key, when one exists
/// * `fees` - The fee settings (default fee, surcharge multiplier)
pub fn calculate(
    task: &RenewalTask,
    entry: Option<&FeeScheduleEntry>,
    fees: &FeeSettings,
) -> FeeAmounts {
    let (cost, fee) = match entry {
        Some(entry) if task.table_fee => {
            let pair = entry.pair_for(task.grace_period, task.sme_status);
            (pair.cost, apply_discount(pair.fee, task.discount))
        }
        _ => (
            task.cost,
            apply_discount_above(task.fee, fees.default_fee, task.discount),
        ),
    };

    FeeAmounts {
        cost,
        fee: apply_late_surcharge(fee, task, fees.grace_surcharge),
    }
}
