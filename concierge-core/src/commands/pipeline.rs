//! Single-message pipeline: policy gate, then intent routing, then the handler.
//!
//! The guardrail runs inside the retrieval-grounded handler, after generation.

use thiserror::Error;

use admissions_policy::{PolicyDecision, PolicyGate};

use crate::domain::{AgentResult, Session};
use crate::retrieval::Index;
use crate::services::generator::AnswerGenerator;
use crate::services::handlers::{self, rag_qa::QaSettings};
use crate::services::router::{Intent, IntentRouter};
use crate::services::store::SessionStore;
use crate::services::tools;

pub const INDEX_NOT_READY_REPLY: &str = "The admissions reference library is not ready yet, so I can't \
answer policy questions right now. Please try again shortly, or contact the admissions office directly.";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    #[error("retrieval index is not loaded")]
    IndexUnavailable,
}

impl RouteError {
    /// Plain reply to show the applicant.
    pub fn reply(&self) -> &'static str {
        match self {
            RouteError::IndexUnavailable => INDEX_NOT_READY_REPLY,
        }
    }
}

/// Everything a single message needs. Borrowed for the duration of one call.
pub struct Pipeline<'a> {
    pub gate: &'a PolicyGate,
    pub router: &'a IntentRouter,
    pub store: &'a dyn SessionStore,
    /// `None` while no index has been built or loaded.
    pub index: Option<&'a Index>,
    pub generator: &'a dyn AnswerGenerator,
    pub qa: QaSettings,
}

/// Outcome plus the decisions that produced it.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub decision: PolicyDecision,
    /// `None` when the gate escalated before routing.
    pub intent: Option<Intent>,
    pub result: AgentResult,
}

pub fn route_message(p: &Pipeline<'_>, session: &Session, message: &str) -> Result<AgentResult, RouteError> {
    dispatch(p, session, message).map(|d| d.result)
}

pub fn dispatch(p: &Pipeline<'_>, session: &Session, message: &str) -> Result<Dispatched, RouteError> {
    let decision = p.gate.should_escalate(message);
    if decision.escalated {
        tracing::info!(session = %session.id, reason = %decision.reason, "escalated to human");
        let result = AgentResult::escalation(&decision.reason);
        return Ok(Dispatched {
            decision,
            intent: None,
            result,
        });
    }

    let intent = p.router.classify(session.segment, message);
    tracing::debug!(session = %session.id, %intent, "routed");

    let result = match intent {
        Intent::Military => handlers::military::run(session, message),
        Intent::Coach => handlers::coach::run(session),
        Intent::Checklist => recover(intent, handlers::checklist::run(p.store, session)),
        Intent::Outreach => match tools::get_checklist(p.store, &session.id) {
            Ok(checklist) => handlers::outreach::run(session, &tools::outstanding_items(&checklist)),
            Err(e) => recover(intent, Err(e)),
        },
        Intent::RetrievalQa => {
            let index = p.index.ok_or(RouteError::IndexUnavailable)?;
            recover(
                intent,
                handlers::rag_qa::run(index, p.generator, p.gate, p.qa, session, message),
            )
        }
    };

    Ok(Dispatched {
        decision,
        intent: Some(intent),
        result,
    })
}

fn recover(intent: Intent, outcome: anyhow::Result<AgentResult>) -> AgentResult {
    outcome.unwrap_or_else(|e| {
        tracing::warn!(%intent, error = %format!("{e:#}"), "handler failed; returning fallback");
        AgentResult::fallback()
    })
}
