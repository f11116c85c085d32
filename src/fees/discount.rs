//! Discount arithmetic.
//!
//! A discount value above 1 is an absolute override of the fee; a value at
//! or below 1 is a fractional reduction. The same rule applies on both the
//! schedule path (scaling the full fee) and the default path (scaling only
//! the portion of the fee above the configured default).

use rust_decimal::Decimal;

/// Applies a discount to a full fee.
///
/// * `discount > 1`: the discount is the new fee (absolute override).
/// * `discount <= 1`: the fee is reduced to `fee * (1 - discount)`.
///
/// # Examples
///
/// ```
/// use renewal_engine::fees::apply_discount;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let fee = Decimal::from_str("500").unwrap();
/// let d = Decimal::from_str("0.1").unwrap();
/// assert_eq!(apply_discount(fee, d), Decimal::from_str("450.0").unwrap());
///
/// let absolute = Decimal::from_str("50").unwrap();
/// assert_eq!(apply_discount(fee, absolute), absolute);
/// ```
pub fn apply_discount(fee: Decimal, discount: Decimal) -> Decimal {
    if discount > Decimal::ONE {
        discount
    } else {
        fee * (Decimal::ONE - discount)
    }
}

/// Applies a discount to only the portion of a fee above a floor.
///
/// Used on the default-fee path: the percentage scales the delta between
/// the task's fee and the configured default, never the default itself.
/// An absolute discount (`> 1`) still overrides the whole fee.
pub fn apply_discount_above(fee: Decimal, floor: Decimal, discount: Decimal) -> Decimal {
    if discount > Decimal::ONE {
        discount
    } else {
        floor + (fee - floor) * (Decimal::ONE - discount)
    }
}
