//! Configuration module
//!
//! CLI settings resolved from flags and environment.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the orchestrator service
    pub orchestrator_url: String,
}
