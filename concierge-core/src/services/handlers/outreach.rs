use crate::domain::{AgentResult, Session, ToolRecord};
use crate::services::tools;

/// Next-step nudge over the items still outstanding, in checklist order.
pub fn run(session: &Session, outstanding: &[String]) -> AgentResult {
    let nudge = tools::next_best_nudge(session.segment, outstanding);
    let message = nudge["message"].as_str().unwrap_or_default();
    let reply = format!(
        "{message}\n\n\
         If you tell me your available time this week (e.g., 30–60 min blocks), I’ll map it to a simple plan."
    );
    AgentResult::new(reply, vec![ToolRecord::new("next_best_nudge", nudge)], Vec::new())
}
