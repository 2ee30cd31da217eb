use anyhow::{bail, Result};
use serde_json::json;

use admissions_policy::PolicyGate;

use crate::domain::{AgentResult, Citation, Session, ToolRecord};
use crate::retrieval::{make_snippet, Index};
use crate::services::generator::{AnswerGenerator, NO_CONTEXT_REPLY};
use crate::services::prompts::{build_user_prompt, SYSTEM_STYLE};

/// Lead sentence of every reply whose search came back empty.
pub const NO_MATCH_NOTE: &str =
    "I couldn't find a matching page in the admissions reference documents for that question.";

/// Retrieval knobs the handler needs.
#[derive(Debug, Clone, Copy)]
pub struct QaSettings {
    pub top_k: usize,
    pub snippet_len: usize,
}

impl Default for QaSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            snippet_len: 280,
        }
    }
}

/// Search, ground the generator on the hits, list sources, then apply the guardrail.
pub fn run(
    index: &Index,
    generator: &dyn AnswerGenerator,
    gate: &PolicyGate,
    settings: QaSettings,
    session: &Session,
    message: &str,
) -> Result<AgentResult> {
    let hits = index.search(message, settings.top_k);

    let mut citations = Vec::with_capacity(hits.len());
    let mut chunks = Vec::with_capacity(hits.len());
    for hit in &hits {
        let snippet = make_snippet(&hit.document.text, settings.snippet_len);
        chunks.push(format!("[{}] {}\n{}", hit.document.doc_id, hit.document.title, snippet));
        citations.push(Citation {
            doc_id: hit.document.doc_id.clone(),
            title: hit.document.title.clone(),
            snippet,
        });
    }
    let context = chunks.join("\n\n");

    let draft = generator.generate_answer(SYSTEM_STYLE, &build_user_prompt(session, message), &context)?;
    if draft.trim().is_empty() {
        bail!("generator returned an empty answer");
    }

    let mut reply = if hits.is_empty() && draft != NO_CONTEXT_REPLY {
        format!("{NO_MATCH_NOTE}\n\n{draft}")
    } else {
        draft
    };
    if !citations.is_empty() {
        reply.push_str("\n\nSources:\n");
        let sources: Vec<String> = citations
            .iter()
            .map(|c| format!("- {}: {}", c.doc_id, c.title))
            .collect();
        reply.push_str(&sources.join("\n"));
    }
    let reply = gate.enforce_no_guarantees(&reply);

    tracing::debug!(hits = hits.len(), "retrieval-grounded answer");
    Ok(AgentResult::new(
        reply,
        vec![ToolRecord::new("rag_search", json!({ "hits": hits.len() }))],
        citations,
    ))
}
