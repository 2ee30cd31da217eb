//! services/audit.rs
//! JSONL audit logbook: routing decisions, escalations, index builds and failures.
//!
//! - `actions.jsonl` receives every event.
//! - `escalations.jsonl` additionally receives escalation events.
//! - Message text is reduced to a single-line preview before it is written.

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::LogbookConfig;

#[derive(Debug, Clone)]
pub struct AuditLog {
    dir: PathBuf,
    enabled: bool,
    preview_len: usize,
}

impl AuditLog {
    pub fn new(cfg: &LogbookConfig) -> Self {
        Self {
            dir: cfg.path.clone(),
            enabled: cfg.enabled,
            preview_len: cfg.preview_len,
        }
    }

    pub fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            enabled: false,
            preview_len: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn actions_path(&self) -> PathBuf {
        self.dir.join("actions.jsonl")
    }

    pub fn escalations_path(&self) -> PathBuf {
        self.dir.join("escalations.jsonl")
    }

    /// Record a generic action event.
    ///
    /// * `agent` — component name (`"pipeline"`, `"retrieval"`, `"cli"`).
    /// * `action` — short verb label (`"routed"`, `"index_built"`).
    /// * `severity` — `"low" | "medium" | "high"`.
    pub fn record_action(&self, agent: &str, action: &str, details: &Value, severity: &str) {
        if !self.enabled {
            return;
        }
        let entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": "action",
            "agent": agent,
            "action": action,
            "severity": severity,
            "details": details
        });
        append_jsonl(&self.actions_path(), &entry);
    }

    pub fn record_escalation(&self, session_id: &str, message: &str, reason: &str, trigger: Option<&str>) {
        if !self.enabled {
            return;
        }
        let details = json!({
            "session_id": session_id,
            "input_preview": self.preview(message),
            "reason": reason,
            "trigger": trigger,
        });
        self.record_action("policy", "escalated", &details, "high");
        let entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": "escalation",
            "details": details
        });
        append_jsonl(&self.escalations_path(), &entry);
    }

    /// Single-line preview cut to the configured length.
    pub fn preview(&self, s: &str) -> String {
        let t = s.replace(['\n', '\r'], " ");
        if t.chars().count() <= self.preview_len {
            return t;
        }
        let mut out: String = t.chars().take(self.preview_len).collect();
        out.push('…');
        out
    }
}

/// Append one JSON value as a line. Write failures are logged, never raised.
fn append_jsonl<S: Serialize>(path: &Path, val: &S) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let line = match serde_json::to_string(val) {
        Ok(l) => l,
        Err(e) => {
            tracing::warn!(error = %e, "audit entry not serializable");
            return;
        }
    };
    match fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(mut f) => {
            if let Err(e) = writeln!(f, "{line}") {
                tracing::warn!(path = %path.display(), error = %e, "audit write failed");
            }
        }
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "audit log unavailable"),
    }
}
