use crate::domain::{AgentResult, Segment, Session};

const ACTIVE_DUTY_EDGE: &str = "\n\nActive-duty edge: your leadership and accountability are strong — \
we’ll translate them into clear *impact* statements and match them to program fit.";

/// Competitiveness coaching. Pure template, no tools.
pub fn run(session: &Session) -> AgentResult {
    let extra = if session.segment == Segment::ActiveDuty {
        ACTIVE_DUTY_EDGE
    } else {
        ""
    };
    let reply = format!(
        "Let’s strengthen competitiveness without overpromising:\n\
         1) Pick 1–2 core themes (impact, curiosity, leadership).\n\
         2) For each activity, write: role → action → measurable outcome.\n\
         3) For essays, use *specific moments*, not general claims.\n\
         4) Ask recommenders early and share your goals + résumé (don’t script them).{extra}\n\n\
         If you paste a short activity description or essay paragraph, I’ll help you refine it."
    );
    AgentResult::new(reply, Vec::new(), Vec::new())
}
