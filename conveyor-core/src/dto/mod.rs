//! Data Transfer Objects
//!
//! Request and response bodies of the orchestrator HTTP API, shared by the
//! orchestrator and its client.

pub mod build;
