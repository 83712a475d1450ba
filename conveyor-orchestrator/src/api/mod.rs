//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod build;
pub mod error;
pub mod health;

use axum::{Router, routing::get, routing::post};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::BuildOrchestrator;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BuildOrchestrator>,
    pub pipeline_file: Arc<PathBuf>,
}

impl AppState {
    pub fn new(orchestrator: Arc<BuildOrchestrator>, pipeline_file: PathBuf) -> Self {
        Self {
            orchestrator,
            pipeline_file: Arc::new(pipeline_file),
        }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Build endpoints
        .route("/build", post(build::trigger_build))
        .route("/builds", get(build::list_builds))
        .route("/status/{id}", get(build::get_status))
        .route("/status/{id}/logs", get(build::get_logs))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
