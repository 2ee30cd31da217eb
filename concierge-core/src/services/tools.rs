//! Deterministic tools the handlers and the CLI call.
//!
//! Each returns a JSON payload that ends up verbatim in an [`AgentResult`] action
//! record.
//!
//! [`AgentResult`]: crate::domain::AgentResult

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};

use crate::domain::{ChecklistError, ChecklistItem, ChecklistStatus, Segment};
use crate::services::store::SessionStore;

/// Days between the soft deadline and the deployment start.
pub const DEPLOYMENT_BUFFER_DAYS: i64 = 14;

pub fn deployment_buffer(deadline: Option<NaiveDate>, deployment_start: Option<NaiveDate>) -> Value {
    let (Some(deadline), Some(start)) = (deadline, deployment_start) else {
        return json!({
            "note": "Provide both a deadline and deployment_start to compute a buffered plan."
        });
    };
    let soft = if start <= deadline {
        start - Duration::days(DEPLOYMENT_BUFFER_DAYS)
    } else {
        deadline
    };
    json!({
        "deadline": deadline.format("%Y-%m-%d").to_string(),
        "deployment_start": start.format("%Y-%m-%d").to_string(),
        "soft_deadline": soft.format("%Y-%m-%d").to_string(),
    })
}

pub fn next_best_nudge(segment: Segment, missing_items: &[String]) -> Value {
    let message = match missing_items.first() {
        None => "Nice work — your file looks complete. Consider polishing your essays and preparing for any interview steps."
            .to_string(),
        Some(item) if segment == Segment::ActiveDuty => format!(
            "Next best step: focus on '{item}'. If your schedule is tight, we can plan a mini-deadline and alternate submission route."
        ),
        Some(item) => format!(
            "Next best step: complete '{item}'. A small milestone today keeps the file moving."
        ),
    };
    json!({ "message": message })
}

pub fn get_checklist(store: &dyn SessionStore, session_id: &str) -> Result<Vec<ChecklistItem>> {
    store.get_checklist(session_id)
}

/// Names of items still `missing` or `in_progress`, in store order.
pub fn outstanding_items(checklist: &[ChecklistItem]) -> Vec<String> {
    checklist
        .iter()
        .filter(|c| c.is_outstanding())
        .map(|c| c.item_name.clone())
        .collect()
}

/// Validate and write one checklist status. Errors with
/// [`ChecklistError::InvalidStatus`] for anything outside the vocabulary.
pub fn update_checklist(
    store: &dyn SessionStore,
    session_id: &str,
    item: &str,
    status: &str,
) -> Result<Value> {
    let status: ChecklistStatus = status.parse()?;
    let item = item.trim();
    if item.is_empty() {
        return Err(ChecklistError::EmptyItem.into());
    }
    store.upsert_checklist_item(session_id, item, status.as_str())?;
    tracing::debug!(session = session_id, item, status = %status, "checklist updated");
    Ok(json!({ "ok": true, "item": item, "status": status.as_str() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn buffer_lands_two_weeks_before_deployment() {
        let v = deployment_buffer(Some(d("2025-11-01")), Some(d("2025-10-15")));
        assert_eq!(v["soft_deadline"], "2025-10-01");
    }

    #[test]
    fn deployment_well_before_deadline_buffers_from_start() {
        let v = deployment_buffer(Some(d("2025-12-01")), Some(d("2025-10-15")));
        assert_eq!(v["soft_deadline"], "2025-10-01");
    }

    #[test]
    fn deployment_on_deadline_still_buffers() {
        let v = deployment_buffer(Some(d("2025-11-01")), Some(d("2025-11-01")));
        assert_eq!(v["soft_deadline"], "2025-10-18");
    }

    #[test]
    fn deployment_after_deadline_keeps_deadline() {
        let v = deployment_buffer(Some(d("2025-11-01")), Some(d("2025-12-01")));
        assert_eq!(v["soft_deadline"], "2025-11-01");
    }

    #[test]
    fn missing_date_asks_for_both() {
        let v = deployment_buffer(None, Some(d("2025-10-15")));
        assert!(v.get("note").is_some());
        assert!(v.get("soft_deadline").is_none());
    }
}
