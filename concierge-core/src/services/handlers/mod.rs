//! Intent handlers. Each produces an [`AgentResult`]; fallible ones return
//! `anyhow::Result` and the pipeline converts failures into a safe reply.
//!
//! [`AgentResult`]: crate::domain::AgentResult

pub mod checklist;
pub mod coach;
pub mod military;
pub mod outreach;
pub mod rag_qa;

pub use checklist::DEFAULT_ITEMS;
