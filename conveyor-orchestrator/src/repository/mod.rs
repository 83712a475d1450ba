//! Repository Module
//!
//! State access layer for the orchestrator.
//! Build records live in process memory for the lifetime of the server.

pub mod status;

pub use status::{StatusStore, StoreError};
