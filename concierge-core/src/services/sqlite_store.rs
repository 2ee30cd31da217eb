// src/services/sqlite_store.rs
//! SQLite-backed [`SessionStore`].
//!
//! - One connection behind a `Mutex`, WAL journal.
//! - `sessions`, `checklist` (unique on `(session_id, item)`) and `messages` tables.
//! - Checklist writes are upserts; message ids are autoincrement so order is stable.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use crate::domain::{ChatMessage, ChecklistItem, Segment, Session};
use crate::services::store::SessionStore;

pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    /// Open/create the database and ensure the schema.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let db = Connection::open(db_path)
            .with_context(|| format!("opening sqlite db {}", db_path.display()))?;
        Self::with_connection(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(db: Connection) -> Result<Self> {
        db.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;

            CREATE TABLE IF NOT EXISTS sessions (
              id             TEXT PRIMARY KEY,
              display_name   TEXT NOT NULL,
              segment        TEXT NOT NULL,
              target_program TEXT NOT NULL,
              deadline       TEXT,              -- YYYY-MM-DD
              created_at     TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS checklist (
              session_id TEXT NOT NULL,
              item       TEXT NOT NULL,
              status     TEXT NOT NULL,
              updated_at TEXT NOT NULL,
              seq        INTEGER NOT NULL,
              PRIMARY KEY (session_id, item)
            );

            CREATE TABLE IF NOT EXISTS messages (
              id         INTEGER PRIMARY KEY AUTOINCREMENT,
              session_id TEXT NOT NULL,
              role       TEXT NOT NULL,
              content    TEXT NOT NULL,
              created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, id);
            "#,
        )?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a session with a fresh id and return it.
    pub fn create_session(
        &self,
        display_name: &str,
        segment: Segment,
        target_program: &str,
        deadline: Option<NaiveDate>,
    ) -> Result<Session> {
        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            display_name: display_name.to_string(),
            segment,
            target_program: target_program.to_string(),
            deadline,
        };
        self.put_session(&session)?;
        tracing::info!(session = %session.id, segment = %segment, "session created");
        Ok(session)
    }

    /// Insert or replace a session row as given.
    pub fn put_session(&self, session: &Session) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            r#"
            INSERT INTO sessions(id, display_name, segment, target_program, deadline, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
              display_name   = excluded.display_name,
              segment        = excluded.segment,
              target_program = excluded.target_program,
              deadline       = excluded.deadline
            "#,
            params![
                session.id,
                session.display_name,
                session.segment.as_str(),
                session.target_program,
                session.deadline.map(|d| d.format("%Y-%m-%d").to_string()),
                now,
            ],
        )?;
        Ok(())
    }
}

impl SessionStore for SqliteStore {
    fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let db = self.conn();
        let row = db
            .query_row(
                "SELECT id, display_name, segment, target_program, deadline FROM sessions WHERE id=?1",
                [session_id],
                |r| {
                    Ok((
                        r.get::<_, String>(0)?,
                        r.get::<_, String>(1)?,
                        r.get::<_, String>(2)?,
                        r.get::<_, String>(3)?,
                        r.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, display_name, segment, target_program, deadline)) = row else {
            return Ok(None);
        };
        let segment: Segment = segment
            .parse()
            .with_context(|| format!("session {id} has a bad segment"))?;
        let deadline = match deadline {
            Some(d) if !d.is_empty() => Some(
                NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .with_context(|| format!("session {id} has a bad deadline '{d}'"))?,
            ),
            _ => None,
        };
        Ok(Some(Session {
            id,
            display_name,
            segment,
            target_program,
            deadline,
        }))
    }

    fn get_checklist(&self, session_id: &str) -> Result<Vec<ChecklistItem>> {
        let db = self.conn();
        let mut stmt = db.prepare(
            "SELECT session_id, item, status, updated_at FROM checklist WHERE session_id=?1 ORDER BY seq",
        )?;
        let rows = stmt.query_map([session_id], |r| {
            Ok(ChecklistItem {
                session_id: r.get(0)?,
                item_name: r.get(1)?,
                status: r.get(2)?,
                updated_at: r.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn upsert_checklist_item(&self, session_id: &str, item: &str, status: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            r#"
            INSERT INTO checklist(session_id, item, status, updated_at, seq)
            VALUES (?1, ?2, ?3, ?4,
                    (SELECT COALESCE(MAX(seq), 0) + 1 FROM checklist WHERE session_id = ?1))
            ON CONFLICT(session_id, item) DO UPDATE SET
              status     = excluded.status,
              updated_at = excluded.updated_at
            "#,
            params![session_id, item, status, now],
        )?;
        Ok(())
    }

    fn add_message(&self, session_id: &str, role: &str, content: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            "INSERT INTO messages(session_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![session_id, role, content, now],
        )?;
        Ok(())
    }

    fn recent_messages(&self, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        let db = self.conn();
        let mut stmt = db.prepare(
            "SELECT role, content, created_at FROM messages WHERE session_id=?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![session_id, limit as i64], |r| {
            Ok(ChatMessage {
                role: r.get(0)?,
                content: r.get(1)?,
                created_at: r.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        out.reverse();
        Ok(out)
    }
}
