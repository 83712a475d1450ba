//! Build Service
//!
//! Accepts build triggers, allocates identifiers and status records, and runs
//! each pipeline on its own supervised task.

use conveyor_core::domain::build::{BuildPhase, BuildStatus};
use conveyor_core::domain::log::LogEntry;
use conveyor_core::domain::pipeline::PipelineDefinition;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::repository::{StatusStore, StoreError};
use crate::service::executor::PipelineExecutor;

/// Source of build identifiers
pub trait BuildIdGenerator: Send + Sync {
    /// Returns an identifier never handed out before
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl BuildIdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Service error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("build {0} not found")]
    NotFound(String),

    #[error("build identifier {0} was already issued")]
    DuplicateId(String),

    #[error("status store rejected the request: {0}")]
    Store(StoreError),
}

impl From<StoreError> for BuildError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => BuildError::NotFound(id),
            StoreError::Duplicate(id) => BuildError::DuplicateId(id),
            other => BuildError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;

/// Entry point for triggering builds and querying their status
pub struct BuildOrchestrator {
    store: Arc<StatusStore>,
    executor: Arc<PipelineExecutor>,
    ids: Arc<dyn BuildIdGenerator>,
}

impl BuildOrchestrator {
    pub fn new(
        store: Arc<StatusStore>,
        executor: Arc<PipelineExecutor>,
        ids: Arc<dyn BuildIdGenerator>,
    ) -> Self {
        Self {
            store,
            executor,
            ids,
        }
    }

    /// Start a build of `definition` and return its identifier immediately
    ///
    /// Must be called from within a tokio runtime. The pipeline runs on a
    /// spawned task; its outcome always ends in a terminal phase on the record.
    pub fn trigger(&self, definition: Arc<PipelineDefinition>) -> Result<String> {
        self.trigger_supervised(definition).map(|(id, _)| id)
    }

    /// Same as [`trigger`](Self::trigger), also returning the supervisor's handle
    pub fn trigger_supervised(
        &self,
        definition: Arc<PipelineDefinition>,
    ) -> Result<(String, JoinHandle<BuildPhase>)> {
        let build_id = self.ids.next_id();

        if let Err(e) = self.store.create(&build_id) {
            error!("Refusing to start build {}: {}", build_id, e);
            return Err(e.into());
        }

        info!(
            "Build {} triggered with {} step(s)",
            build_id,
            definition.len()
        );

        let handle = tokio::spawn(supervise(
            build_id.clone(),
            definition,
            Arc::clone(&self.executor),
            Arc::clone(&self.store),
        ));

        Ok((build_id, handle))
    }

    /// Snapshot of a build's current status
    pub fn query_status(&self, build_id: &str) -> Result<BuildStatus> {
        Ok(self.store.get(build_id)?)
    }

    /// Snapshots of every known build, newest first
    pub fn list_builds(&self) -> Vec<BuildStatus> {
        self.store.list()
    }
}

/// Runs the executor on its own task and makes sure its failures land in the store
async fn supervise(
    build_id: String,
    definition: Arc<PipelineDefinition>,
    executor: Arc<PipelineExecutor>,
    store: Arc<StatusStore>,
) -> BuildPhase {
    let task = {
        let build_id = build_id.clone();
        tokio::spawn(async move { executor.execute(&build_id, &definition).await })
    };

    let reason = match task.await {
        Ok(Ok(phase)) => {
            info!("Build {} finished: {}", build_id, phase);
            return phase;
        }
        Ok(Err(e)) => e.to_string(),
        Err(e) if e.is_panic() => "pipeline task panicked".to_string(),
        Err(e) => format!("pipeline task did not complete: {}", e),
    };

    error!("Build {} aborted: {}", build_id, reason);
    abort_build(&store, &build_id, &reason)
}

/// Writes a Failed phase unless the record already reached a terminal one
fn abort_build(store: &StatusStore, build_id: &str, reason: &str) -> BuildPhase {
    match store.update(
        build_id,
        BuildPhase::Failed,
        LogEntry::error(format!("Build aborted: {}", reason)),
    ) {
        Ok(()) => BuildPhase::Failed,
        Err(e) => {
            warn!("Could not record abort of build {}: {}", build_id, e);
            store
                .get(build_id)
                .map(|status| status.phase)
                .unwrap_or(BuildPhase::Failed)
        }
    }
}
