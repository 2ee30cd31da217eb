// Public modules so the agent binary and tests can reach them
pub mod commands;
pub mod config;
pub mod domain;
pub mod retrieval;
pub mod services;

pub use commands::{route_message, Concierge, RouteError};
pub use config::CoreConfig;
pub use domain::{AgentResult, Citation, ChecklistItem, Segment, Session, ToolRecord};
pub use retrieval::{Document, Index, RetrievalError, RetrievalHit};

// Policy gate lives in its own crate; re-exported for callers that only depend on the core.
pub use admissions_policy::{enforce_no_guarantees, should_escalate, PolicyDecision, PolicyGate};
