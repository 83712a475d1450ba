//! Build API Handlers
//!
//! HTTP endpoints for triggering builds and polling their status.

use axum::{
    Json,
    extract::{Path, State},
};
use conveyor_core::domain::log::LogEntry;
use conveyor_core::dto::build::{BuildStatusResponse, BuildSummary, TriggerResponse};
use std::sync::Arc;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::pipeline_file::load_pipeline_file;

/// POST /build
/// Load the pipeline file and start a new build
pub async fn trigger_build(State(state): State<AppState>) -> ApiResult<Json<TriggerResponse>> {
    tracing::info!("Triggering build...");

    let definition = load_pipeline_file(&state.pipeline_file).await?;
    let id = state.orchestrator.trigger(Arc::new(definition))?;

    Ok(Json(TriggerResponse::triggered(id)))
}

/// GET /status/{id}
/// Current status of a build
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BuildStatusResponse>> {
    tracing::debug!("Getting status of build: {}", id);

    let status = state.orchestrator.query_status(&id)?;

    Ok(Json(status.into()))
}

/// GET /status/{id}/logs
/// Structured log entries of a build
pub async fn get_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<LogEntry>>> {
    tracing::debug!("Getting logs of build: {}", id);

    let status = state.orchestrator.query_status(&id)?;

    Ok(Json(status.log))
}

/// GET /builds
/// List every build known to this server
pub async fn list_builds(State(state): State<AppState>) -> Json<Vec<BuildSummary>> {
    tracing::debug!("Listing all builds");

    Json(
        state
            .orchestrator
            .list_builds()
            .into_iter()
            .map(BuildSummary::from)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;
    use crate::repository::StatusStore;
    use crate::service::{
        BuildOrchestrator, PipelineExecutor, ProcessStepRunner, UuidGenerator,
    };
    use axum::http::StatusCode;
    use conveyor_core::domain::build::BuildPhase;
    use std::io::Write;
    use std::time::Duration;

    fn state_for(pipeline_file: std::path::PathBuf) -> AppState {
        let store = Arc::new(StatusStore::new());
        let executor = Arc::new(PipelineExecutor::new(
            Arc::new(ProcessStepRunner::new()),
            Arc::clone(&store),
        ));
        let orchestrator = Arc::new(BuildOrchestrator::new(
            store,
            executor,
            Arc::new(UuidGenerator),
        ));
        AppState::new(orchestrator, pipeline_file)
    }

    fn pipeline_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    async fn poll_until_terminal(state: &AppState, id: &str) -> BuildStatusResponse {
        for _ in 0..500 {
            let Json(status) = get_status(State(state.clone()), Path(id.to_string()))
                .await
                .unwrap();
            if status.status.is_terminal() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("build {id} did not finish in time");
    }

    #[tokio::test]
    async fn test_trigger_and_poll_failed_build() {
        let file = pipeline_file(
            r#"
pipeline:
  - name: compile
    cmd: ["true"]
  - name: test
    cmd: ["sh", "-c", "echo assertion blew up; exit 1"]
  - name: deploy
    cmd: ["true"]
"#,
        );
        let state = state_for(file.path().to_path_buf());

        let Json(triggered) = trigger_build(State(state.clone())).await.unwrap();
        assert_eq!(triggered.message, "Build triggered");

        let status = poll_until_terminal(&state, &triggered.id).await;
        assert_eq!(status.id, triggered.id);
        assert_eq!(status.status, BuildPhase::Failed);
        assert!(status.logs.contains("Step test failed"));
        assert!(status.logs.contains("assertion blew up"));
        assert!(!status.logs.contains("deploy"));

        let Json(entries) = get_logs(State(state.clone()), Path(triggered.id.clone()))
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_trigger_successful_build_is_listed() {
        let file = pipeline_file("pipeline:\n  - name: build\n    cmd: [\"true\"]\n");
        let state = state_for(file.path().to_path_buf());

        let Json(triggered) = trigger_build(State(state.clone())).await.unwrap();
        let status = poll_until_terminal(&state, &triggered.id).await;
        assert_eq!(status.status, BuildPhase::Success);

        let Json(builds) = list_builds(State(state.clone())).await;
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].id, triggered.id);
        assert_eq!(builds[0].log_entries, 2);
    }

    #[tokio::test]
    async fn test_unknown_build_is_not_found() {
        let state = state_for("unused.yaml".into());

        let err = get_status(State(state.clone()), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(&err, ApiError::NotFound(msg) if msg == "Build ID not found"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = get_logs(State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_pipeline_file_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path().join("missing.yaml"));

        let err = trigger_build(State(state.clone())).await.unwrap_err();
        assert!(
            matches!(&err, ApiError::InternalError(msg) if msg == "Failed to load pipeline configuration")
        );

        let Json(builds) = list_builds(State(state)).await;
        assert!(builds.is_empty());
    }
}
