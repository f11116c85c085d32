//! Invoice batch integration.
//!
//! Groups a renewal batch by client, resolves each client in the external
//! invoicing system, builds VAT-aware line items from the computed fees
//! and creates one invoice per client group. Groups are processed in
//! ascending client display-name order; a missing client stops the run at
//! once, keeping the invoices already created and naming the client in
//! the returned error.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::fees::{calculate, vat_rate_for_tax_id};
use crate::models::InvoiceStep;
use crate::notify::format_date;
use crate::store::Repository;
use crate::workflow::{LogService, entry_for};

use super::client::{InvoiceDraft, InvoiceLine, InvoicingClient};

/// The outcome of one invoicing run: how many invoices were created
/// before the run completed or stopped, and the error that stopped it.
#[derive(Debug)]
pub struct InvoiceRun {
    /// Invoices successfully created.
    pub created: usize,
    /// The error that halted the run, when it did not complete.
    pub error: Option<EngineError>,
}

/// Creates invoices in the external system for renewal batches.
pub struct InvoiceIntegration {
    system: Arc<dyn InvoicingClient>,
}

impl InvoiceIntegration {
    /// Creates an integration talking to the given external system.
    pub fn new(system: Arc<dyn InvoicingClient>) -> Self {
        Self { system }
    }

    /// Invoices a renewal batch, one invoice per client group.
    ///
    /// Earlier groups' invoices are never rolled back when a later group
    /// fails; the run stops at the first missing client or API error and
    /// reports the partial count.
    pub async fn create_invoices(
        &self,
        repo: &mut Repository,
        log: &LogService,
        config: &ConfigLoader,
        ids: &[String],
        actor: &str,
    ) -> EngineResult<InvoiceRun> {
        if ids.is_empty() {
            return Err(EngineError::EmptySelection);
        }

        let settings = config.settings();
        let job_id = log.create_job_id();
        let today = Utc::now().date_naive();

        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for id in ids {
            let Some(task) = repo.task(id) else { continue };
            let Some(client) = repo.client_for_task(task) else {
                return Err(EngineError::ClientMissing {
                    id: task.matter_id.clone(),
                });
            };
            groups
                .entry(client.display_name.clone())
                .or_default()
                .push(id.clone());
        }

        let mut created = 0usize;

        for (client_name, task_ids) in groups {
            let external = match self.system.find_client(&client_name).await {
                Ok(Some(external)) => external,
                Ok(None) => {
                    return Ok(InvoiceRun {
                        created,
                        error: Some(EngineError::ExternalClientNotFound { name: client_name }),
                    });
                }
                Err(err) => {
                    return Ok(InvoiceRun {
                        created,
                        error: Some(err),
                    });
                }
            };

            let vat_rate = vat_rate_for_tax_id(external.tax_id.as_deref(), &settings.fees);

            let mut lines = Vec::new();
            for task_id in &task_ids {
                let task = repo.task(task_id).expect("grouped task exists");
                let Some(matter) = repo.matter(&task.matter_id) else {
                    continue;
                };
                let entry = if task.table_fee {
                    config.schedule_entry(
                        &matter.country,
                        &matter.category,
                        &matter.origin,
                        task.detail,
                    )
                } else {
                    None
                };
                let amounts = calculate(task, entry, &settings.fees);

                let has_cost_line = amounts.cost != Decimal::ZERO;
                let wording = if has_cost_line {
                    "fee for monitoring and payment"
                } else {
                    "fee and tax"
                };
                let client_language = repo
                    .client_for_task(task)
                    .map(|c| c.language)
                    .unwrap_or(crate::models::Language::En);
                lines.push(InvoiceLine {
                    description: format!(
                        "Renewal year {}, case {}, {}, due {}: {}",
                        task.detail,
                        matter.uid,
                        matter.title,
                        format_date(task.due_date, client_language),
                        wording
                    ),
                    amount: amounts.fee,
                    vat_rate,
                });
                if has_cost_line {
                    lines.push(InvoiceLine {
                        description: format!(
                            "Official fee, case {}, renewal year {}",
                            matter.uid, task.detail
                        ),
                        amount: amounts.cost,
                        vat_rate: Decimal::ZERO,
                    });
                }
            }

            let draft = InvoiceDraft {
                client_id: external.id.clone(),
                date: today,
                payment_terms: settings.invoicing.payment_terms.clone(),
                account_reference: settings.invoicing.account_reference.clone(),
                lines,
            };

            match self.system.create_invoice(&draft).await {
                Ok(invoice_id) => {
                    created += 1;
                    info!(
                        client = %client_name,
                        invoice = %invoice_id,
                        renewals = task_ids.len(),
                        job_id,
                        "invoice created"
                    );
                }
                Err(err) => {
                    return Ok(InvoiceRun {
                        created,
                        error: Some(err),
                    });
                }
            }

            // Keep the billing axis in sync with the external system.
            let mut entries = Vec::new();
            for task_id in &task_ids {
                let task = repo.task_mut(task_id).expect("grouped task exists");
                let mut entry = entry_for(task, job_id, actor);
                entry.from_invoice = Some(task.invoice_step);
                task.invoice_step = InvoiceStep::Invoiced;
                entry.to_invoice = Some(task.invoice_step);
                entries.push(entry);
            }
            log.append(entries);
        }

        Ok(InvoiceRun {
            created,
            error: None,
        })
    }
}
