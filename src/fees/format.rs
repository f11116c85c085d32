//! Locale-aware monetary formatting for client notices.
//!
//! Amounts are rendered with two decimal places and the thousands/decimal
//! separators of the client's language: "1,234.56" (en), "1 234,56" (fr),
//! "1.234,56" (de).

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Language;

/// Formats a monetary amount for the given language.
///
/// # Examples
///
/// ```
/// use renewal_engine::fees::format_amount;
/// use renewal_engine::models::Language;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let amount = Decimal::from_str("1234.5").unwrap();
/// assert_eq!(format_amount(amount, Language::En), "1,234.50");
/// assert_eq!(format_amount(amount, Language::Fr), "1 234,50");
/// assert_eq!(format_amount(amount, Language::De), "1.234,50");
/// ```
pub fn format_amount(amount: Decimal, language: Language) -> String {
    let (thousands, decimal) = match language {
        Language::En => (',', '.'),
        Language::Fr => (' ', ','),
        Language::De => ('.', ','),
    };

    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded);
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let negative = int_part.starts_with('-');
    let digits = int_part.trim_start_matches('-');

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{}{}{}", sign, grouped, decimal, frac_part)
}
