//! File-completion footer appended to routed replies.

use serde::Serialize;

use crate::domain::ChecklistItem;
use crate::services::handlers::DEFAULT_ITEMS;

const MAX_NEXT_STEPS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// 0..=100, share of default items marked done.
    pub percent: u32,
    /// Default items not yet done, in default order.
    pub remaining: Vec<String>,
}

pub fn file_completion(checklist: &[ChecklistItem]) -> Progress {
    let remaining: Vec<String> = DEFAULT_ITEMS
        .iter()
        .filter(|d| !checklist.iter().any(|c| c.item_name == **d && c.is_done()))
        .map(|d| d.to_string())
        .collect();
    let total = DEFAULT_ITEMS.len() as u32;
    let done = total - remaining.len() as u32;
    Progress {
        percent: (done * 100 + total / 2) / total,
        remaining,
    }
}

pub fn footer(progress: &Progress) -> String {
    let header = format!("\n\n---\n**File completion:** {}%\n", progress.percent);
    if progress.remaining.is_empty() {
        return header
            + "✅ Your core file items are marked complete. Next: confirm submission and review program-specific requirements.";
    }
    let mut lines = vec![header, "**Recommended next steps (to reach 100%):**".to_string()];
    for (i, item) in progress.remaining.iter().take(MAX_NEXT_STEPS).enumerate() {
        lines.push(format!("{}. Finish: **{item}**", i + 1));
    }
    if progress.remaining.len() > MAX_NEXT_STEPS {
        lines.push(format!(
            "(+{} more items remaining)",
            progress.remaining.len() - MAX_NEXT_STEPS
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, status: &str) -> ChecklistItem {
        ChecklistItem {
            session_id: "s".into(),
            item_name: name.into(),
            status: status.into(),
            updated_at: None,
        }
    }

    #[test]
    fn empty_checklist_is_zero_percent_with_three_steps() {
        let p = file_completion(&[]);
        assert_eq!(p.percent, 0);
        let f = footer(&p);
        assert!(f.contains("1. Finish: **Application form**"));
        assert!(f.contains("3. Finish: **Recommendations (2)**"));
        assert!(!f.contains("4. Finish"));
        assert!(f.contains("(+2 more items remaining)"));
    }

    #[test]
    fn done_statuses_count_and_others_do_not() {
        let p = file_completion(&[
            item("Application form", "submitted"),
            item("Official transcripts", "verified"),
            item("Recommendations (2)", "in_progress"),
            item("Unrelated", "verified"),
        ]);
        assert_eq!(p.percent, 40);
        assert_eq!(p.remaining.len(), 3);
    }
}
