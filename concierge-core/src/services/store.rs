//! Session / checklist / message persistence seam.
//!
//! The pipeline reads through [`SessionStore`]; the CLI wires a SQLite-backed
//! store, tests use [`InMemoryStore`].

use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::{ChatMessage, ChecklistItem, Session};

pub trait SessionStore: Send + Sync {
    fn get_session(&self, session_id: &str) -> Result<Option<Session>>;

    /// Checklist rows in insertion order.
    fn get_checklist(&self, session_id: &str) -> Result<Vec<ChecklistItem>>;

    /// Insert or overwrite `(session_id, item)`. Status is stored verbatim.
    fn upsert_checklist_item(&self, session_id: &str, item: &str, status: &str) -> Result<()>;

    fn add_message(&self, session_id: &str, role: &str, content: &str) -> Result<()>;

    /// Last `limit` messages, oldest first.
    fn recent_messages(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>>;
}

#[derive(Default)]
struct Tables {
    sessions: HashMap<String, Session>,
    checklist: Vec<ChecklistItem>,
    messages: HashMap<String, Vec<ChatMessage>>,
}

/// Process-local store. Nothing survives the process.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_session(&self, session: Session) {
        let mut t = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        t.sessions.insert(session.id.clone(), session);
    }
}

impl SessionStore for InMemoryStore {
    fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let t = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(t.sessions.get(session_id).cloned())
    }

    fn get_checklist(&self, session_id: &str) -> Result<Vec<ChecklistItem>> {
        let t = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(t
            .checklist
            .iter()
            .filter(|c| c.session_id == session_id)
            .cloned()
            .collect())
    }

    fn upsert_checklist_item(&self, session_id: &str, item: &str, status: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let mut t = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match t
            .checklist
            .iter_mut()
            .find(|c| c.session_id == session_id && c.item_name == item)
        {
            Some(row) => {
                row.status = status.to_string();
                row.updated_at = Some(now);
            }
            None => t.checklist.push(ChecklistItem {
                session_id: session_id.to_string(),
                item_name: item.to_string(),
                status: status.to_string(),
                updated_at: Some(now),
            }),
        }
        Ok(())
    }

    fn add_message(&self, session_id: &str, role: &str, content: &str) -> Result<()> {
        let mut t = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        t.messages
            .entry(session_id.to_string())
            .or_default()
            .push(ChatMessage {
                role: role.to_string(),
                content: content.to_string(),
                created_at: Utc::now().to_rfc3339(),
            });
        Ok(())
    }

    fn recent_messages(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        let t = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let all = t.messages.get(session_id).map(Vec::as_slice).unwrap_or(&[]);
        let start = all.len().saturating_sub(limit);
        Ok(all[start..].to_vec())
    }
}
