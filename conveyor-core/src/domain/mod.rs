//! Core domain types
//!
//! These types are shared between the orchestrator (which owns build state)
//! and the client/CLI (which display it).

pub mod build;
pub mod log;
pub mod pipeline;
