use chrono::NaiveDate;

use crate::domain::{AgentResult, Session, ToolRecord};
use crate::services::tools;

const PLAN: &str = "Military support plan (deployment-aware):\n\
- Front-load transcript and recommender requests\n\
- Set mini-deadlines and keep a ‘soft deadline’ buffer\n\
- Prepare a concise service-to-impact translation for activities\n\
\nIf you share a deployment start date (YYYY-MM-DD), I’ll compute a buffered timeline.";

/// First whitespace token that parses as `YYYY-MM-DD` once surrounding
/// punctuation is trimmed.
pub fn find_deployment_date(message: &str) -> Option<NaiveDate> {
    message.split_whitespace().find_map(|tok| {
        let tok = tok.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        NaiveDate::parse_from_str(tok, "%Y-%m-%d").ok()
    })
}

pub fn run(session: &Session, message: &str) -> AgentResult {
    let start = find_deployment_date(message);
    let plan = tools::deployment_buffer(session.deadline, start);
    AgentResult::new(
        PLAN.to_string(),
        vec![ToolRecord::new("deployment_buffer", plan)],
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_token_with_trailing_punctuation() {
        let d = find_deployment_date("I deploy 2025-10-15, what's the plan?").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 10, 15).unwrap());
    }

    #[test]
    fn first_valid_date_wins() {
        let d = find_deployment_date("orders 2025-13-01 then 2026-01-05 and 2026-02-01").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert!(find_deployment_date("no dates here").is_none());
    }
}
