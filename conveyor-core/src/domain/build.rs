//! Build domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::log::LogEntry;

/// Coarse lifecycle state of a build
///
/// Phases only move forward: Pending -> InProgress -> (Success | Failed).
/// Pending -> Failed is also allowed so a build that could not start still
/// reaches a terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildPhase {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Success,
    Failed,
}

impl BuildPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, BuildPhase::Success | BuildPhase::Failed)
    }

    /// Whether a record in phase `self` may move to `next`
    ///
    /// InProgress -> InProgress is allowed: every completed step rewrites the
    /// phase together with its log entry.
    pub fn can_transition_to(self, next: BuildPhase) -> bool {
        use BuildPhase::*;

        matches!(
            (self, next),
            (Pending, InProgress)
                | (Pending, Failed)
                | (InProgress, InProgress)
                | (InProgress, Success)
                | (InProgress, Failed)
        )
    }

    /// Wire label, identical to the serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            BuildPhase::Pending => "Pending",
            BuildPhase::InProgress => "In Progress",
            BuildPhase::Success => "Success",
            BuildPhase::Failed => "Failed",
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status record of one build
///
/// Owned by the orchestrator's status store; everything handed out is a snapshot copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    pub id: String,
    pub phase: BuildPhase,
    pub log: Vec<LogEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BuildStatus {
    /// Fresh record in the Pending phase with an empty log
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            phase: BuildPhase::Pending,
            log: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Log messages joined with newlines
    pub fn joined_log(&self) -> String {
        self.log
            .iter()
            .map(|entry| entry.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
