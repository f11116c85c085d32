//! VAT treatment.
//!
//! VAT applies to the service-fee portion of an amount, never to official
//! government costs. Clients whose tax id carries the configured domestic
//! prefix are invoiced at a zero rate.

use rust_decimal::Decimal;

use crate::config::FeeSettings;
use crate::models::Client;

/// Returns the VAT amount for a fee at the given rate.
pub fn vat_amount(fee: Decimal, rate: Decimal) -> Decimal {
    fee * rate
}

/// Returns the VAT rate for a tax identifier: the configured rate, or
/// zero when the id starts with the domestic prefix.
pub fn vat_rate_for_tax_id(tax_id: Option<&str>, fees: &FeeSettings) -> Decimal {
    match tax_id {
        Some(id) if id.starts_with(&fees.domestic_tax_prefix) => Decimal::ZERO,
        _ => fees.vat_rate,
    }
}

/// Returns the VAT rate to invoice a client at, from its tax id.
pub fn vat_rate_for(client: &Client, fees: &FeeSettings) -> Decimal {
    vat_rate_for_tax_id(client.tax_id.as_deref(), fees)
}
