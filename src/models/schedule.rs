//! Fee schedule models.
//!
//! A fee schedule entry holds the official cost and service fee for one
//! jurisdiction/category/origin/annuity-year key, in four variants covering
//! the grace-period and SME-reduction combinations. Entries are read-only
//! from this subsystem's perspective.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cost/fee pair inside a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePair {
    /// The official (government) cost.
    pub cost: Decimal,
    /// The service fee.
    pub fee: Decimal,
}

/// A fee schedule entry keyed by country, category, origin and annuity year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeScheduleEntry {
    /// The jurisdiction code (e.g. "EP", "FR").
    pub country: String,
    /// The matter category (e.g. "patent", "trademark").
    pub category: String,
    /// The filing origin (e.g. "national", "pct").
    pub origin: String,
    /// The annuity year this entry covers.
    pub qt: u32,
    /// Normal rate.
    pub normal: FeePair,
    /// SME-reduced rate.
    pub reduced: FeePair,
    /// Grace-period surcharge rate.
    pub grace: FeePair,
    /// Grace-period surcharge at the SME-reduced rate.
    pub grace_reduced: FeePair,
}

impl FeeScheduleEntry {
    /// Selects the cost/fee pair for the given grace and SME flags.
    pub fn pair_for(&self, grace_period: bool, sme_status: bool) -> FeePair {
        match (grace_period, sme_status) {
            (false, false) => self.normal,
            (false, true) => self.reduced,
            (true, false) => self.grace,
            (true, true) => self.grace_reduced,
        }
    }
}
