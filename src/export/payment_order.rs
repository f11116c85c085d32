//! Payment-order XML export.
//!
//! Renders a batch of renewals into the payment-order format accepted by
//! the patent offices, one `<fees>` block per renewal plus a header and a
//! trailer with the running totals. A batch mixing jurisdictions is
//! rejected before any output is produced. The document is small and
//! fixed-shape, so it is written with a local escaping helper rather than
//! an XML dependency.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::fees::calculate;
use crate::models::{Matter, RenewalTask};
use crate::store::Repository;

/// Escapes the five XML-reserved characters.
fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// The office fee code for one renewal.
///
/// The European office numbers renewal fees from 31 upward, printed over
/// three digits; other offices take the stored detail code as-is.
fn type_of_fee(country: &str, detail: u32) -> String {
    if country == "EP" {
        format!("{:03}", detail + 30)
    } else {
        detail.to_string()
    }
}

fn fee_block(task: &RenewalTask, matter: &Matter, cost: Decimal) -> String {
    let mut out = String::new();
    out.push_str("  <fees>\n");
    out.push_str(&format!(
        "    <procedure>{}</procedure>\n",
        xml_escape(&matter.country)
    ));
    out.push_str("    <document-id>\n");
    out.push_str(&format!(
        "      <country>{}</country>\n",
        xml_escape(&matter.country)
    ));
    out.push_str(&format!(
        "      <doc-number>{}</doc-number>\n",
        xml_escape(&matter.document_number())
    ));
    out.push_str(&format!(
        "      <date>{}</date>\n",
        matter.filing_date.format("%Y%m%d")
    ));
    out.push_str(&format!("      <kind>{}</kind>\n", xml_escape(&matter.kind)));
    out.push_str("    </document-id>\n");
    out.push_str(&format!(
        "    <file-reference>{}</file-reference>\n",
        xml_escape(&matter.uid)
    ));
    out.push_str(&format!("    <owner>{}</owner>\n", xml_escape(&matter.owner)));
    out.push_str("    <fee>\n");
    out.push_str(&format!(
        "      <type-of-fee>{}</type-of-fee>\n",
        type_of_fee(&matter.country, task.detail)
    ));
    out.push_str(&format!("      <sub-amount>{}</sub-amount>\n", cost));
    out.push_str("      <factor>1</factor>\n");
    out.push_str(&format!("      <total-amount>{}</total-amount>\n", cost));
    out.push_str("    </fee>\n");
    out.push_str("  </fees>\n");
    out
}

/// Renders the payment-order XML for a renewal batch.
///
/// # Errors
///
/// Returns [`EngineError::EmptySelection`] for an empty id list,
/// [`EngineError::MatterNotFound`] when a selected renewal references a
/// matter the repository does not hold, and
/// [`EngineError::MixedJurisdictions`] when the batch spans more than one
/// country. All checks run before any output is built.
pub fn payment_order_xml(
    repo: &Repository,
    config: &ConfigLoader,
    ids: &[String],
    order_date: NaiveDate,
) -> EngineResult<String> {
    if ids.is_empty() {
        return Err(EngineError::EmptySelection);
    }

    let settings = config.settings();

    let mut batch: Vec<(&RenewalTask, &Matter)> = Vec::new();
    for id in ids {
        let Some(task) = repo.task(id) else { continue };
        let matter = repo
            .matter(&task.matter_id)
            .ok_or_else(|| EngineError::MatterNotFound {
                id: task.matter_id.clone(),
            })?;
        batch.push((task, matter));
    }
    if batch.is_empty() {
        return Err(EngineError::EmptySelection);
    }

    let countries: BTreeSet<&str> = batch.iter().map(|(_, m)| m.country.as_str()).collect();
    if countries.len() > 1 {
        return Err(EngineError::MixedJurisdictions {
            found: countries.into_iter().collect::<Vec<_>>().join(", "),
        });
    }

    let mut total = Decimal::ZERO;
    let mut blocks = String::new();
    for (task, matter) in &batch {
        let entry = if task.table_fee {
            config.schedule_entry(&matter.country, &matter.category, &matter.origin, task.detail)
        } else {
            None
        };
        let amounts = calculate(task, entry, &settings.fees);
        total += amounts.cost;
        blocks.push_str(&fee_block(task, matter, amounts.cost));
    }

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<payment-order>\n");
    out.push_str("  <header>\n");
    out.push_str(&format!(
        "    <sender>{}</sender>\n",
        xml_escape(&settings.order.sender_name)
    ));
    out.push_str(&format!(
        "    <payment-reference>ANNUITY{}</payment-reference>\n",
        order_date.format("%Y%m%d")
    ));
    out.push_str("  </header>\n");
    out.push_str(&blocks);
    out.push_str("  <trailer>\n");
    out.push_str(&format!("    <total-amount>{}</total-amount>\n", total));
    out.push_str(&format!(
        "    <record-count>{}</record-count>\n",
        batch.len()
    ));
    out.push_str("  </trailer>\n");
    out.push_str("</payment-order>\n");

    Ok(out)
}
