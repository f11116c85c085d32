//! CSV export of renewal batches.
//!
//! Produces one header row from the configured captions and one row per
//! exportable renewal with the computed cost/fee substituted for the
//! stored values. No CSV dependency: fields are quoted locally when they
//! carry separators, quotes or newlines.

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::fees::calculate;
use crate::store::Repository;

/// Quotes a CSV field when it needs it.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders the CSV export for a renewal batch.
///
/// The header is exactly the configured caption list; unknown ids are
/// skipped best-effort like every other batch operation.
///
/// # Errors
///
/// Returns [`EngineError::EmptySelection`] for an empty id list and
/// [`EngineError::MatterNotFound`] when a selected renewal references a
/// matter the repository does not hold; a selected renewal is never
/// silently omitted from the document.
pub fn export_csv(repo: &Repository, config: &ConfigLoader, ids: &[String]) -> EngineResult<String> {
    if ids.is_empty() {
        return Err(EngineError::EmptySelection);
    }

    let settings = config.settings();
    let mut out = String::new();

    let header: Vec<String> = settings
        .export_captions
        .iter()
        .map(|c| csv_field(c))
        .collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for id in ids {
        let Some(task) = repo.task(id) else { continue };
        let matter = repo
            .matter(&task.matter_id)
            .ok_or_else(|| EngineError::MatterNotFound {
                id: task.matter_id.clone(),
            })?;

        let entry = if task.table_fee {
            config.schedule_entry(&matter.country, &matter.category, &matter.origin, task.detail)
        } else {
            None
        };
        let amounts = calculate(task, entry, &settings.fees);

        let row = [
            csv_field(&matter.uid),
            csv_field(&matter.title),
            csv_field(&matter.country),
            task.detail.to_string(),
            task.due_date.format("%Y-%m-%d").to_string(),
            task.step.to_string(),
            amounts.cost.to_string(),
            amounts.fee.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    Ok(out)
}
