//! Invoicing system seam.
//!
//! All calls to the external invoicing system go through the narrow
//! [`InvoicingClient`] trait: an HTTP JSON implementation for production
//! and an in-memory implementation for tests and dry runs.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A client record as known to the external invoicing system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalClient {
    /// The external system's client identifier.
    pub id: String,
    /// The client name in the external system.
    pub name: String,
    /// The client's VAT tax identifier, when registered.
    #[serde(default)]
    pub tax_id: Option<String>,
}

/// One line item of an invoice draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// The line description.
    pub description: String,
    /// The net line amount.
    pub amount: Decimal,
    /// The VAT rate for this line; official costs carry zero.
    pub vat_rate: Decimal,
}

/// The invoice payload sent to the external system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    /// The external client the invoice is issued to.
    pub client_id: String,
    /// The invoice creation date.
    pub date: NaiveDate,
    /// Fixed payment terms.
    pub payment_terms: String,
    /// The account reference the invoice is booked under.
    pub account_reference: String,
    /// The line items.
    pub lines: Vec<InvoiceLine>,
}

/// Resolves clients and creates invoices in the external system.
#[async_trait]
pub trait InvoicingClient: Send + Sync {
    /// Looks up a client whose name starts with the given prefix.
    async fn find_client(&self, name_prefix: &str) -> EngineResult<Option<ExternalClient>>;

    /// Creates an invoice, returning the external invoice identifier.
    async fn create_invoice(&self, draft: &InvoiceDraft) -> EngineResult<String>;
}

/// Reqwest-based JSON client for the invoicing HTTP API.
pub struct HttpInvoicingClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CreatedInvoice {
    id: String,
}

impl HttpInvoicingClient {
    /// Creates a client for the API at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl InvoicingClient for HttpInvoicingClient {
    async fn find_client(&self, name_prefix: &str) -> EngineResult<Option<ExternalClient>> {
        let url = format!("{}/clients", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("name", name_prefix)])
            .send()
            .await
            .map_err(|e| EngineError::InvoicingApi {
                message: format!("client lookup failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(EngineError::InvoicingApi {
                message: format!("client lookup returned {}", response.status()),
            });
        }

        let matches: Vec<ExternalClient> =
            response.json().await.map_err(|e| EngineError::InvoicingApi {
                message: format!("invalid client lookup payload: {}", e),
            })?;

        Ok(matches.into_iter().next())
    }

    async fn create_invoice(&self, draft: &InvoiceDraft) -> EngineResult<String> {
        let url = format!("{}/invoices", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(draft)
            .send()
            .await
            .map_err(|e| EngineError::InvoicingApi {
                message: format!("invoice creation failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(EngineError::InvoicingApi {
                message: format!("invoice creation returned {}", response.status()),
            });
        }

        let created: CreatedInvoice =
            response.json().await.map_err(|e| EngineError::InvoicingApi {
                message: format!("invalid invoice payload: {}", e),
            })?;

        Ok(created.id)
    }
}

/// In-memory invoicing system with a fixed client directory.
///
/// Records every created invoice; used by tests and dry runs.
#[derive(Debug, Default)]
pub struct StaticInvoicingClient {
    clients: Vec<ExternalClient>,
    created: Mutex<Vec<InvoiceDraft>>,
}

impl StaticInvoicingClient {
    /// Creates a fake system knowing the given clients.
    pub fn new(clients: Vec<ExternalClient>) -> Self {
        Self {
            clients,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Returns every invoice created so far.
    pub fn created(&self) -> Vec<InvoiceDraft> {
        self.created.lock().expect("invoice mutex poisoned").clone()
    }
}

#[async_trait]
impl InvoicingClient for StaticInvoicingClient {
    async fn find_client(&self, name_prefix: &str) -> EngineResult<Option<ExternalClient>> {
        Ok(self
            .clients
            .iter()
            .find(|c| c.name.starts_with(name_prefix))
            .cloned())
    }

    async fn create_invoice(&self, draft: &InvoiceDraft) -> EngineResult<String> {
        let mut created = self.created.lock().expect("invoice mutex poisoned");
        created.push(draft.clone());
        Ok(format!("inv_{:04}", created.len()))
    }
}
