use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod pipeline_file;
pub mod repository;
pub mod service;

use crate::config::Config;
use crate::repository::StatusStore;
use crate::service::{BuildOrchestrator, PipelineExecutor, ProcessStepRunner, UuidGenerator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conveyor_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Conveyor Orchestrator...");

    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        "Pipeline file: {}, work dir: {}",
        config.pipeline_file.display(),
        config
            .work_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| ".".to_string())
    );

    // Wire up the build pipeline once; every handler shares these instances
    let runner = match &config.work_dir {
        Some(dir) => ProcessStepRunner::with_work_dir(dir),
        None => ProcessStepRunner::new(),
    };
    let store = Arc::new(StatusStore::new());
    let executor = Arc::new(PipelineExecutor::new(Arc::new(runner), Arc::clone(&store)));
    let orchestrator = Arc::new(BuildOrchestrator::new(
        store,
        executor,
        Arc::new(UuidGenerator),
    ));

    let state = api::AppState::new(orchestrator, config.pipeline_file.clone());
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
