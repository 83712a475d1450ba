//! Build DTOs exchanged over the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::build::{BuildPhase, BuildStatus};

/// Reply to a build trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub message: String,
    pub id: String,
}

impl TriggerResponse {
    pub fn triggered(id: impl Into<String>) -> Self {
        Self {
            message: "Build triggered".to_string(),
            id: id.into(),
        }
    }
}

/// Status of a build as served by `GET /status/{id}`
///
/// `logs` is the build's log trail joined into one text blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatusResponse {
    pub id: String,
    pub status: BuildPhase,
    pub logs: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BuildStatus> for BuildStatusResponse {
    fn from(status: BuildStatus) -> Self {
        Self {
            logs: status.joined_log(),
            id: status.id,
            status: status.phase,
            created_at: status.created_at,
            updated_at: status.updated_at,
        }
    }
}

/// Lightweight build summary for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub id: String,
    pub status: BuildPhase,
    pub log_entries: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BuildStatus> for BuildSummary {
    fn from(status: BuildStatus) -> Self {
        Self {
            log_entries: status.log.len(),
            id: status.id,
            status: status.phase,
            created_at: status.created_at,
            updated_at: status.updated_at,
        }
    }
}
