// src/commands/api.rs
use anyhow::{anyhow, Context, Result};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

use admissions_policy::PolicyGate;

use crate::commands::pipeline::{dispatch, Pipeline, RouteError};
use crate::config::CoreConfig;
use crate::domain::{AgentResult, ChatMessage, ChecklistItem, Session};
use crate::retrieval::{self, Index, RetrievalError, RetrievalHit, SharedIndex};
use crate::services::audit::AuditLog;
use crate::services::generator::{AnswerGenerator, TemplateGenerator};
use crate::services::handlers::rag_qa::QaSettings;
use crate::services::progress;
use crate::services::router::IntentRouter;
use crate::services::store::SessionStore;
use crate::services::tools;

/// Outcome of trying to load the persisted index at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexStatus {
    Loaded { docs: usize, fingerprint: String },
    Missing,
    Corrupt(String),
}

/// Long-lived facade: owns the gate, router, live index, store and generator.
pub struct Concierge {
    config: CoreConfig,
    gate: PolicyGate,
    router: IntentRouter,
    index: SharedIndex,
    store: Arc<dyn SessionStore>,
    generator: Arc<dyn AnswerGenerator>,
    audit: AuditLog,
}

impl Concierge {
    /// Wire from config. The policy gate comes from `policy.rules_path` when set,
    /// the built-in rules otherwise. The index starts empty; see [`Concierge::load_index`].
    pub fn new(config: CoreConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let gate = match &config.policy.rules_path {
            Some(path) if path.exists() => PolicyGate::from_file(path)
                .with_context(|| format!("loading policy rules {}", path.display()))?,
            Some(path) => {
                tracing::warn!(path = %path.display(), "policy rules file missing; using built-in rules");
                PolicyGate::default()
            }
            None => PolicyGate::default(),
        };
        let audit = AuditLog::new(&config.logbook);
        Ok(Self {
            config,
            gate,
            router: IntentRouter::default(),
            index: SharedIndex::new(),
            store,
            generator: Arc::new(TemplateGenerator::new()),
            audit,
        })
    }

    pub fn open(root: &Path, store: Arc<dyn SessionStore>) -> Result<Self> {
        let config = CoreConfig::load(root)?;
        Self::new(config, store)
    }

    pub fn with_generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_gate(mut self, gate: PolicyGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn gate(&self) -> &PolicyGate {
        &self.gate
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub fn shared_index(&self) -> &SharedIndex {
        &self.index
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    // ----------------- Index lifecycle -----------------

    /// Load the persisted index into the live slot. Missing or corrupt artifacts
    /// leave the slot untouched and are reported, not raised.
    pub fn load_index(&self) -> Result<IndexStatus> {
        let path = &self.config.retrieval.index_path;
        match retrieval::load_from(path) {
            Ok(index) => {
                let status = IndexStatus::Loaded {
                    docs: index.len(),
                    fingerprint: index.fingerprint().to_string(),
                };
                self.index.publish(index);
                Ok(status)
            }
            Err(RetrievalError::IndexNotFound(_)) => {
                tracing::warn!(path = %path.display(), "no retrieval index; run build-index");
                Ok(IndexStatus::Missing)
            }
            Err(RetrievalError::IndexCorrupt(why)) => {
                tracing::warn!(path = %path.display(), %why, "retrieval index rejected");
                self.audit.record_action(
                    "retrieval",
                    "index_rejected",
                    &json!({ "path": path.display().to_string(), "reason": why }),
                    "medium",
                );
                Ok(IndexStatus::Corrupt(why))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Build from the docs folder, persist, then publish. The live index keeps
    /// serving until the new one is complete.
    pub fn rebuild_index(&self) -> Result<Arc<Index>> {
        let cfg = &self.config.retrieval;
        let docs = retrieval::load_from_folder(&cfg.docs_dir)?;
        let index = Index::build_with(docs, cfg.max_features)?;
        retrieval::save_to(&index, &cfg.index_path)?;
        self.audit.record_action(
            "retrieval",
            "index_built",
            &json!({
                "docs": index.len(),
                "vocabulary": index.vocabulary_size(),
                "fingerprint": index.fingerprint(),
            }),
            "low",
        );
        self.index.publish(index);
        self.index
            .current()
            .ok_or_else(|| anyhow!("index slot empty right after publish"))
    }

    pub fn search(&self, query: &str, top_k: Option<usize>) -> Result<Vec<RetrievalHit>, RouteError> {
        let index = self.index.current().ok_or(RouteError::IndexUnavailable)?;
        Ok(index.search(query, top_k.unwrap_or(self.config.retrieval.top_k)))
    }

    // ----------------- Conversation -----------------

    /// Full chat turn: log the user message, run the pipeline, append the progress
    /// footer to routed replies, log the assistant reply.
    pub fn chat(&self, session_id: &str, message: &str) -> Result<AgentResult> {
        let session = self
            .store
            .get_session(session_id)?
            .ok_or_else(|| anyhow!("session not found: {session_id}"))?;

        self.store.add_message(&session.id, "user", message)?;
        let mut result = self.route(&session, message);

        if !result.escalated_to_human && self.config.pipeline.append_progress_footer {
            match self.store.get_checklist(&session.id) {
                Ok(checklist) => {
                    let footer = progress::footer(&progress::file_completion(&checklist));
                    result.reply.push_str(&footer);
                }
                Err(e) => tracing::warn!(error = %e, "progress footer skipped"),
            }
        }

        self.store.add_message(&session.id, "assistant", &result.reply)?;
        Ok(result)
    }

    /// Pipeline only: no message log, no footer.
    pub fn route(&self, session: &Session, message: &str) -> AgentResult {
        let live = self.index.current();
        let pipeline = Pipeline {
            gate: &self.gate,
            router: &self.router,
            store: self.store.as_ref(),
            index: live.as_deref(),
            generator: self.generator.as_ref(),
            qa: QaSettings {
                top_k: self.config.retrieval.top_k,
                snippet_len: self.config.retrieval.snippet_len,
            },
        };

        match dispatch(&pipeline, session, message) {
            Ok(d) => {
                if d.decision.escalated {
                    self.audit.record_escalation(
                        &session.id,
                        message,
                        &d.decision.reason,
                        d.decision.trigger.as_deref(),
                    );
                } else {
                    self.audit.record_action(
                        "pipeline",
                        "routed",
                        &json!({
                            "session_id": session.id,
                            "intent": d.intent,
                            "actions": d.result.actions.iter().map(|a| a.tool_name.as_str()).collect::<Vec<_>>(),
                            "citations": d.result.citations.len(),
                        }),
                        "low",
                    );
                }
                d.result
            }
            Err(e) => {
                self.audit.record_action(
                    "pipeline",
                    "route_failed",
                    &json!({ "session_id": session.id, "error": e.to_string() }),
                    "medium",
                );
                AgentResult::new(e.reply().to_string(), Vec::new(), Vec::new())
            }
        }
    }

    pub fn update_checklist(&self, session_id: &str, item: &str, status: &str) -> Result<serde_json::Value> {
        tools::update_checklist(self.store.as_ref(), session_id, item, status)
    }

    pub fn checklist(&self, session_id: &str) -> Result<Vec<ChecklistItem>> {
        tools::get_checklist(self.store.as_ref(), session_id)
    }

    pub fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        self.store
            .recent_messages(session_id, self.config.store.recent_messages)
    }
}
