//! Configuration types for the Renewal Workflow Engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Fee arithmetic settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FeeSettings {
    /// VAT rate applied to the service-fee portion (e.g. "0.20").
    pub vat_rate: Decimal,
    /// Tax-id prefix marking domestic clients, which are VAT-exempt.
    pub domestic_tax_prefix: String,
    /// Late-payment multiplier applied to the fee when a grace-period
    /// renewal was actually paid after its due date (e.g. "1.5").
    pub grace_surcharge: Decimal,
    /// The default service fee used when no schedule entry exists.
    pub default_fee: Decimal,
}

/// Client notification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NoticeSettings {
    /// Days before the due date a first/reminder notice remains valid.
    pub first_offset_days: i64,
    /// Days before the due date a final notice remains valid (shorter).
    pub last_offset_days: i64,
    /// Days before the due date client instructions are expected.
    pub instruction_offset_days: i64,
    /// Whether notices must reach the client directly when no matter
    /// contact exists; a client without an email is then an error.
    pub require_client_email: bool,
}

/// SMTP transport settings for outgoing notices.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    /// SMTP relay host.
    pub host: String,
    /// SMTP relay port.
    pub port: u16,
    /// SMTP user name.
    pub user: String,
    /// SMTP password.
    pub password: String,
    /// Sender address for notices.
    pub from_email: String,
    /// Sender display name for notices.
    pub from_name: String,
}

/// External invoicing system settings.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoicingSettings {
    /// Base URL of the invoicing HTTP API.
    pub base_url: String,
    /// Fixed payment terms carried on every invoice (e.g. "30 days net").
    pub payment_terms: String,
    /// The account reference invoices are booked under.
    pub account_reference: String,
}

/// Payment-order document settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSettings {
    /// The sender name placed in the payment-order header.
    pub sender_name: String,
}

/// The complete engine settings loaded from `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Fee arithmetic settings.
    pub fees: FeeSettings,
    /// Notification settings.
    pub notices: NoticeSettings,
    /// SMTP transport settings.
    pub smtp: SmtpSettings,
    /// Invoicing system settings.
    pub invoicing: InvoicingSettings,
    /// Payment-order settings.
    pub order: OrderSettings,
    /// Column captions for the CSV export, in output order.
    pub export_captions: Vec<String>,
}
