//! Matter, case event and client collaborator records.
//!
//! The general matter/actor CRUD lives outside this crate; these are the
//! minimal read models the workflow engine needs: case references for
//! notice text and payment orders, client grouping and recipients for
//! notifications and invoicing, and the case events the engine appends on
//! abandonment or lapse.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of a case event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The application was filed.
    Filed,
    /// The right was granted.
    Granted,
    /// The client abandoned the right.
    Abandoned,
    /// The right lapsed for non-payment.
    Lapsed,
}

/// An event on a matter's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseEvent {
    /// The kind of event.
    pub kind: EventKind,
    /// The date the event occurred.
    pub date: NaiveDate,
}

/// A designated contact person on a matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// The contact's name.
    pub name: String,
    /// The contact's email address.
    pub email: String,
    /// The contact's role on the matter (recipients need role "contact").
    pub role: String,
}

/// The IP right (patent/trademark) record owning renewal tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matter {
    /// Unique identifier.
    pub id: String,
    /// The case reference shown to clients and officials.
    pub uid: String,
    /// The matter title.
    pub title: String,
    /// The jurisdiction code (e.g. "EP", "FR").
    pub country: String,
    /// The category (e.g. "patent", "trademark").
    pub category: String,
    /// The filing origin (e.g. "national", "pct").
    pub origin: String,
    /// The document kind code used in payment orders (e.g. "B1").
    pub kind: String,
    /// The filing number, when available.
    #[serde(default)]
    pub filing_number: Option<String>,
    /// The publication number, when available.
    #[serde(default)]
    pub publication_number: Option<String>,
    /// The filing date.
    pub filing_date: NaiveDate,
    /// The grant date, once granted.
    #[serde(default)]
    pub grant_date: Option<NaiveDate>,
    /// The owner name used in payment orders.
    pub owner: String,
    /// The client this matter is managed for.
    pub client_id: String,
    /// Designated contact persons.
    #[serde(default)]
    pub contacts: Vec<Contact>,
    /// The event timeline; the engine appends abandoned/lapsed events here.
    #[serde(default)]
    pub events: Vec<CaseEvent>,
}

impl Matter {
    /// Returns the filing-or-publication number with all non-digit
    /// characters stripped, as required by payment-order document ids.
    pub fn document_number(&self) -> String {
        self.filing_number
            .as_deref()
            .or(self.publication_number.as_deref())
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect()
    }
}

/// The language a client is addressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// French.
    Fr,
    /// English.
    En,
    /// German.
    De,
}

/// A client actor: the party renewals are notified to and invoiced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier.
    pub id: String,
    /// Display name; batch processing orders client groups by this.
    pub display_name: String,
    /// The client's own reference, echoed in notices.
    pub reference: String,
    /// The client's email address, when known.
    #[serde(default)]
    pub email: Option<String>,
    /// The language to address the client in.
    pub language: Language,
    /// The VAT tax identifier, used to decide VAT treatment.
    #[serde(default)]
    pub tax_id: Option<String>,
}
