//! Notice message models and localized text.
//!
//! One notice goes to one client and carries all of that client's renewals
//! for the stage, each with a localized description and the computed
//! amounts, plus per-client totals and the validity/instruction dates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Client, Language, Matter, RenewalTask};

use super::stage::NoticeStage;

/// One renewal line inside a client notice.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeLine {
    /// The renewal task this line covers.
    pub task_id: String,
    /// Localized description of the renewal.
    pub description: String,
    /// The official cost.
    pub cost: Decimal,
    /// The service fee.
    pub fee: Decimal,
    /// VAT on the fee.
    pub vat: Decimal,
    /// cost + fee + VAT.
    pub total: Decimal,
    /// cost + fee, excluding VAT.
    pub total_ht: Decimal,
}

/// A grouped notice for one client.
#[derive(Debug, Clone, Serialize)]
pub struct RenewalNotice {
    /// The client the notice is addressed to.
    pub client_id: String,
    /// The client's display name.
    pub client_name: String,
    /// The resolved recipient addresses.
    pub recipients: Vec<String>,
    /// The language the notice is written in.
    pub language: Language,
    /// The escalation stage label ("first"/"warn"/"last").
    pub stage: String,
    /// Whether the subject carries the REMINDER marker.
    pub reminder: bool,
    /// The subject line.
    pub subject: String,
    /// One line per renewal in this client's group.
    pub lines: Vec<NoticeLine>,
    /// Sum of `total` across the lines.
    pub total: Decimal,
    /// Sum of `total_ht` across the lines.
    pub total_ht: Decimal,
    /// The date the quoted amounts remain valid.
    pub validity_date: NaiveDate,
    /// The date instructions are expected by; absent on final notices.
    pub instruction_deadline: Option<NaiveDate>,
}

/// Formats a date the way the language expects it.
pub fn format_date(date: NaiveDate, language: Language) -> String {
    match language {
        Language::De => date.format("%d.%m.%Y").to_string(),
        _ => date.format("%d/%m/%Y").to_string(),
    }
}

/// Builds the localized one-line description of a renewal: case reference,
/// title, client reference and the filed/granted narrative with its date.
pub fn build_description(matter: &Matter, client: &Client, task: &RenewalTask) -> String {
    let language = client.language;
    let narrative = match matter.grant_date {
        Some(granted) => match language {
            Language::Fr => format!("delivre le {}", format_date(granted, language)),
            Language::En => format!("granted {}", format_date(granted, language)),
            Language::De => format!("erteilt am {}", format_date(granted, language)),
        },
        None => match language {
            Language::Fr => format!("depose le {}", format_date(matter.filing_date, language)),
            Language::En => format!("filed {}", format_date(matter.filing_date, language)),
            Language::De => format!(
                "angemeldet am {}",
                format_date(matter.filing_date, language)
            ),
        },
    };

    match language {
        Language::Fr => format!(
            "Annuite {} pour le dossier {} ({}), {}, {}",
            task.detail, matter.uid, client.reference, matter.title, narrative
        ),
        Language::En => format!(
            "Renewal year {} for case {} ({}), {}, {}",
            task.detail, matter.uid, client.reference, matter.title, narrative
        ),
        Language::De => format!(
            "Jahresgebuehr {} fuer Akte {} ({}), {}, {}",
            task.detail, matter.uid, client.reference, matter.title, narrative
        ),
    }
}

/// Builds the subject line for a stage.
pub fn build_subject(stage: NoticeStage, reminder: bool, client_reference: &str) -> String {
    let base = format!("Renewal fees due, ref. {}", client_reference);
    if reminder || stage.is_reminder() {
        format!("REMINDER: {}", base)
    } else {
        base
    }
}
