// src/services/mod.rs

pub mod audit;
pub mod generator;    // answer generation seam (template / passthrough)
pub mod handlers;     // one module per intent
pub mod progress;     // file-completion footer
pub mod prompts;
pub mod router;       // ordered keyword rules -> Intent
pub mod sqlite_store; // rusqlite-backed SessionStore
pub mod store;        // SessionStore trait + in-memory impl
pub mod tools;

// Public API
pub use audit::AuditLog;
pub use generator::{AnswerGenerator, PassthroughGenerator, TemplateGenerator};
pub use router::{Intent, IntentRouter};
pub use sqlite_store::SqliteStore;
pub use store::{InMemoryStore, SessionStore};
