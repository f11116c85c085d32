//! External invoicing integration.
//!
//! The [`InvoicingClient`] seam isolates the external HTTP API;
//! [`InvoiceIntegration`] drives the grouped, stop-on-failure batch runs.

mod client;
mod integration;

pub use client::{
    ExternalClient, HttpInvoicingClient, InvoiceDraft, InvoiceLine, InvoicingClient,
    StaticInvoicingClient,
};
pub use integration::{InvoiceIntegration, InvoiceRun};
