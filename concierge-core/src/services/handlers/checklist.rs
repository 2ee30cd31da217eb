use anyhow::Result;
use serde_json::json;

use crate::domain::{AgentResult, Session, ToolRecord};
use crate::services::store::SessionStore;
use crate::services::tools;

/// Items every application file is expected to track.
pub const DEFAULT_ITEMS: [&str; 5] = [
    "Application form",
    "Official transcripts",
    "Recommendations (2)",
    "Personal statement / essays",
    "Application fee or waiver",
];

/// Read-only status report of the session's checklist.
pub fn run(store: &dyn SessionStore, session: &Session) -> Result<AgentResult> {
    let current = tools::get_checklist(store, &session.id)?;

    let mut lines = vec!["Here’s your current file checklist status:".to_string()];
    if current.is_empty() {
        lines.push("- No items tracked yet. Start with these defaults:".to_string());
        lines.extend(DEFAULT_ITEMS.iter().map(|i| format!("  - {i} (set to: missing)")));
    } else {
        lines.extend(current.iter().map(|c| format!("- {}: **{}**", c.item_name, c.status)));
    }
    let untracked = DEFAULT_ITEMS
        .iter()
        .any(|d| !current.iter().any(|c| c.item_name == *d));
    if untracked {
        lines.push(
            "\nIf you want, I can initialize missing default items as `missing` so we can track progress."
                .to_string(),
        );
    }
    lines.push("\nWhat’s the *next* item you want to tackle today?".to_string());

    let action = ToolRecord::new("get_checklist", json!({ "checklist": current }));
    Ok(AgentResult::new(lines.join("\n"), vec![action], Vec::new()))
}
