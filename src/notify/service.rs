//! Staged, grouped client notifications.
//!
//! One call covers a list of stages processed strictly in order; per stage
//! the eligible renewals are grouped by client and one message is sent per
//! group, in ascending client display-name order. The whole call shares a
//! single job id; every notified renewal is logged as transitioned to
//! FIRST_CALL, with the grace axis recorded only for the final stage.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::fees::{calculate, vat_amount, vat_rate_for};
use crate::models::LifecycleStep;
use crate::store::Repository;
use crate::workflow::{LogService, entry_for};

use super::mailer::Mailer;
use super::notice::{NoticeLine, RenewalNotice, build_description, build_subject};
use super::stage::NoticeStage;

/// Orchestrates grouped, staged client notifications.
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
}

impl NotificationService {
    /// Creates a service dispatching through the given transport.
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Sends staged notices for a batch of renewal ids.
    ///
    /// Stages are processed strictly in the given order; an empty stage
    /// never short-circuits the loop. The stage at index 0 targets tasks
    /// not yet in grace, index 1 targets tasks already in grace. Returns
    /// the total number of renewals notified across all stages, or the
    /// first error encountered. On error, groups whose notices already
    /// went out keep their state changes and their audit rows.
    pub async fn send_notifications(
        &self,
        repo: &mut Repository,
        log: &LogService,
        config: &ConfigLoader,
        ids: &[String],
        stages: &[NoticeStage],
        reminder: bool,
        actor: &str,
    ) -> EngineResult<usize> {
        if ids.is_empty() {
            return Err(EngineError::EmptySelection);
        }

        let job_id = log.create_job_id();
        let settings = config.settings();
        let mut processed = 0usize;

        for (index, stage) in stages.iter().enumerate() {
            let wants_grace = index >= 1;

            // Group the stage's eligible renewals by client, keyed by
            // display name for deterministic processing order.
            let mut groups: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
            for id in ids {
                let Some(task) = repo.task(id) else { continue };
                if task.grace_period != wants_grace {
                    continue;
                }
                let Some(client) = repo.client_for_task(task) else {
                    return Err(EngineError::ClientMissing {
                        id: task.matter_id.clone(),
                    });
                };
                groups
                    .entry((client.display_name.clone(), client.id.clone()))
                    .or_default()
                    .push(id.clone());
            }

            for ((client_name, client_id), task_ids) in groups {
                let client = repo
                    .client(&client_id)
                    .ok_or_else(|| EngineError::ClientMissing {
                        id: client_id.clone(),
                    })?
                    .clone();

                // Prefer the matters' designated contacts; fall back to
                // the client's own address.
                let mut recipients = Vec::new();
                for task_id in &task_ids {
                    let task = repo.task(task_id).expect("grouped task exists");
                    if let Some(matter) = repo.matter(&task.matter_id) {
                        for contact in &matter.contacts {
                            if contact.role == "contact" && !recipients.contains(&contact.email) {
                                recipients.push(contact.email.clone());
                            }
                        }
                    }
                }
                if recipients.is_empty() {
                    match &client.email {
                        Some(email) => recipients.push(email.clone()),
                        None if settings.notices.require_client_email => {
                            return Err(EngineError::MissingRecipient {
                                client: client_name,
                            });
                        }
                        None => {
                            warn!(client = %client_name, "no recipient email, group skipped");
                            continue;
                        }
                    }
                }

                let vat_rate = vat_rate_for(&client, &settings.fees);
                let mut lines = Vec::new();
                let mut earliest_due = None;
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
                    let vat = vat_amount(amounts.fee, vat_rate);
                    lines.push(NoticeLine {
                        task_id: task.id.clone(),
                        description: build_description(matter, &client, task),
                        cost: amounts.cost,
                        fee: amounts.fee,
                        vat,
                        total: amounts.cost + amounts.fee + vat,
                        total_ht: amounts.cost + amounts.fee,
                    });
                    earliest_due = match earliest_due {
                        Some(due) if due <= task.due_date => Some(due),
                        _ => Some(task.due_date),
                    };
                }

                let Some(due) = earliest_due else { continue };
                let validity_date = due - Duration::days(stage.validity_offset_days(&settings.notices));
                let instruction_deadline = stage
                    .has_instruction_deadline()
                    .then(|| due - Duration::days(settings.notices.instruction_offset_days));

                let notice = RenewalNotice {
                    client_id: client_id.clone(),
                    client_name: client_name.clone(),
                    recipients,
                    language: client.language,
                    stage: stage.label().to_string(),
                    reminder: reminder || stage.is_reminder(),
                    subject: build_subject(*stage, reminder, &client.reference),
                    total: lines.iter().map(|l| l.total).sum(),
                    total_ht: lines.iter().map(|l| l.total_ht).sum(),
                    lines,
                    validity_date,
                    instruction_deadline,
                };

                self.mailer.send(&notice).await?;

                info!(
                    client = %client_name,
                    stage = stage.label(),
                    renewals = task_ids.len(),
                    job_id,
                    "notice dispatched"
                );

                // The dispatched group is now notified: step moves to
                // FIRST_CALL, and a final notice opens the grace period.
                // Entries are appended per group, so a failure in a later
                // group never loses a dispatched group's trail.
                let mut group_entries = Vec::with_capacity(task_ids.len());
                for task_id in &task_ids {
                    let task = repo.task_mut(task_id).expect("grouped task exists");
                    let mut entry = entry_for(task, job_id, actor);
                    task.step = LifecycleStep::FirstCall;
                    entry.to_step = task.step;
                    if stage.enters_grace() {
                        entry.from_grace = Some(task.grace_period);
                        task.grace_period = true;
                        entry.to_grace = Some(true);
                    }
                    group_entries.push(entry);
                    processed += 1;
                }
                log.append(group_entries);
            }
        }

        Ok(processed)
    }
}
