//! Status Repository
//!
//! In-memory, concurrency-safe store of build status records.
//!
//! The map lives behind a single `RwLock` and is only reachable through the
//! operations below. Every mutation is completed inside one write guard, so a
//! reader either sees a record before an update or after it, never halfway.
//! Guards are never held across an `.await`.

use chrono::Utc;
use conveyor_core::domain::build::{BuildPhase, BuildStatus};
use conveyor_core::domain::log::LogEntry;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Store error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("build {0} already exists")]
    Duplicate(String),

    #[error("build {0} not found")]
    NotFound(String),

    #[error("build {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: BuildPhase,
        to: BuildPhase,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Keeper of every build's status record
#[derive(Debug, Default)]
pub struct StatusStore {
    builds: RwLock<HashMap<String, BuildStatus>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh Pending record with an empty log
    pub fn create(&self, id: &str) -> Result<()> {
        let mut builds = self.write();

        if builds.contains_key(id) {
            return Err(StoreError::Duplicate(id.to_string()));
        }

        builds.insert(id.to_string(), BuildStatus::new(id));
        Ok(())
    }

    /// Set the phase and append one log entry in a single step
    pub fn update(&self, id: &str, phase: BuildPhase, entry: LogEntry) -> Result<()> {
        self.mutate(id, phase, Some(entry))
    }

    /// Set the phase without touching the log
    pub fn set_phase(&self, id: &str, phase: BuildPhase) -> Result<()> {
        self.mutate(id, phase, None)
    }

    /// Snapshot of a single record
    pub fn get(&self, id: &str) -> Result<BuildStatus> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Snapshots of every record, newest first
    pub fn list(&self) -> Vec<BuildStatus> {
        let mut builds: Vec<BuildStatus> = self.read().values().cloned().collect();
        builds.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        builds
    }

    fn mutate(&self, id: &str, phase: BuildPhase, entry: Option<LogEntry>) -> Result<()> {
        let mut builds = self.write();

        let record = builds
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if !record.phase.can_transition_to(phase) {
            return Err(StoreError::InvalidTransition {
                id: id.to_string(),
                from: record.phase,
                to: phase,
            });
        }

        record.phase = phase;
        if let Some(entry) = entry {
            record.log.push(entry);
        }
        record.updated_at = Utc::now();

        Ok(())
    }

    // Every mutation leaves the map consistent before it can panic, so a
    // poisoned lock still guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, BuildStatus>> {
        self.builds.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, BuildStatus>> {
        self.builds.write().unwrap_or_else(PoisonError::into_inner)
    }
}
