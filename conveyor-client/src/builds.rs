//! Build-related API endpoints

use conveyor_core::domain::log::LogEntry;
use conveyor_core::dto::build::{BuildStatusResponse, BuildSummary, TriggerResponse};
use std::time::Duration;
use tokio::time::Instant;

use crate::OrchestratorClient;
use crate::error::{ClientError, Result};

impl OrchestratorClient {
    /// Trigger a build of the server's pipeline
    ///
    /// Returns as soon as the build is scheduled; use [`get_status`](Self::get_status)
    /// or [`wait_for_build`](Self::wait_for_build) to follow it.
    pub async fn trigger_build(&self) -> Result<TriggerResponse> {
        let url = format!("{}/build", self.base_url);
        let response = self.client.post(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get the current status of a build
    pub async fn get_status(&self, build_id: &str) -> Result<BuildStatusResponse> {
        let url = format!("{}/status/{}", self.base_url, build_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Get the structured log entries of a build
    pub async fn get_logs(&self, build_id: &str) -> Result<Vec<LogEntry>> {
        let url = format!("{}/status/{}/logs", self.base_url, build_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List every build known to the orchestrator
    pub async fn list_builds(&self) -> Result<Vec<BuildSummary>> {
        let url = format!("{}/builds", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Poll a build every `interval` until it reaches Success or Failed
    pub async fn wait_for_build(
        &self,
        build_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<BuildStatusResponse> {
        let started = Instant::now();

        loop {
            let status = self.get_status(build_id).await?;
            if status.status.is_terminal() {
                return Ok(status);
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Err(ClientError::Timeout {
                    id: build_id.to_string(),
                    elapsed,
                });
            }

            tracing::debug!("Build {} is {}, polling again", build_id, status.status);
            tokio::time::sleep(interval.min(timeout - elapsed)).await;
        }
    }
}
