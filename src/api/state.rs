//! Application state for the Renewal Workflow Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::ConfigLoader;
use crate::error::EngineResult;
use crate::invoicing::{HttpInvoicingClient, InvoiceIntegration, InvoicingClient};
use crate::notify::{Mailer, NotificationService, SmtpMailer};
use crate::store::Repository;
use crate::workflow::{LogService, WorkflowEngine};

/// Shared application state.
///
/// Contains the repository, the audit trail, the loaded configuration and
/// the services every handler drives. Cheap to clone; all fields are
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    repo: Arc<RwLock<Repository>>,
    log: Arc<LogService>,
    config: Arc<ConfigLoader>,
    engine: Arc<WorkflowEngine>,
    notifications: Arc<NotificationService>,
    invoicing: Arc<InvoiceIntegration>,
}

impl AppState {
    /// Creates the application state from its collaborators.
    ///
    /// The mail and invoicing transports are injected so tests can run the
    /// full router against in-memory fakes.
    pub fn new(
        config: ConfigLoader,
        repo: Repository,
        log: LogService,
        mailer: Arc<dyn Mailer>,
        invoicing_client: Arc<dyn InvoicingClient>,
    ) -> Self {
        let log = Arc::new(log);
        Self {
            repo: Arc::new(RwLock::new(repo)),
            engine: Arc::new(WorkflowEngine::new(Arc::clone(&log))),
            notifications: Arc::new(NotificationService::new(mailer)),
            invoicing: Arc::new(InvoiceIntegration::new(invoicing_client)),
            log,
            config: Arc::new(config),
        }
    }

    /// Builds the production state, with the SMTP mailer and the HTTP
    /// invoicing client constructed from the loaded settings.
    pub fn from_config(
        config: ConfigLoader,
        repo: Repository,
        log: LogService,
    ) -> EngineResult<Self> {
        let mailer = Arc::new(SmtpMailer::new(&config.settings().smtp)?);
        let invoicing = Arc::new(HttpInvoicingClient::new(
            config.settings().invoicing.base_url.clone(),
        ));
        Ok(Self::new(config, repo, log, mailer, invoicing))
    }

    /// Returns the shared repository lock.
    pub fn repo(&self) -> &RwLock<Repository> {
        &self.repo
    }

    /// Returns the audit trail.
    pub fn log(&self) -> &LogService {
        &self.log
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the workflow engine.
    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    /// Returns the notification service.
    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    /// Returns the invoicing integration.
    pub fn invoicing(&self) -> &InvoiceIntegration {
        &self.invoicing
    }
}
