// src/commands/mod.rs
pub mod init;
pub mod pipeline;
mod api;

pub use api::{Concierge, IndexStatus};
pub use init::{ensure_initialized, ensure_initialized_at, InitReport};
pub use pipeline::{dispatch, route_message, Dispatched, Pipeline, RouteError};
