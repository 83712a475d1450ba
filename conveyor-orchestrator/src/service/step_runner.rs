//! Step runner
//!
//! Executes a single pipeline step as an external process and reports its
//! combined output. A failing step is an ordinary result, not an error.

use async_trait::async_trait;
use conveyor_core::domain::pipeline::PipelineStep;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Outcome of running one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    /// stdout followed by stderr
    pub output: String,
    /// true iff the process exited with status zero
    pub ok: bool,
    /// Exit code, `None` when the process never started or was killed by a signal
    pub exit_code: Option<i32>,
}

impl StepOutput {
    fn not_started(reason: String) -> Self {
        Self {
            output: reason,
            ok: false,
            exit_code: None,
        }
    }
}

/// Service trait for running pipeline steps
#[async_trait]
pub trait StepRunner: Send + Sync {
    /// Runs `step` to completion, spawning at most one process and never retrying
    async fn run(&self, step: &PipelineStep) -> StepOutput;
}

/// Runs steps as local child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessStepRunner {
    work_dir: Option<PathBuf>,
}

impl ProcessStepRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every step with `dir` as its working directory
    pub fn with_work_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: Some(dir.into()),
        }
    }
}

#[async_trait]
impl StepRunner for ProcessStepRunner {
    async fn run(&self, step: &PipelineStep) -> StepOutput {
        let Some(program) = step.program() else {
            return StepOutput::not_started(format!("step '{}' has no command", step.name));
        };

        debug!("Spawning step '{}': {:?}", step.name, step.command);

        let mut command = Command::new(program);
        command
            .args(step.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.work_dir {
            command.current_dir(dir);
        }

        let output = match command.output().await {
            Ok(output) => output,
            Err(e) => {
                warn!("Step '{}' could not be started: {}", step.name, e);
                return StepOutput::not_started(format!("failed to start '{}': {}", program, e));
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        StepOutput {
            output: combined,
            ok: output.status.success(),
            exit_code: output.status.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str, cmd: &[&str]) -> PipelineStep {
        PipelineStep::new(name, cmd.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn test_zero_exit_is_ok() {
        let out = ProcessStepRunner::new().run(&step("ok", &["true"])).await;
        assert!(out.ok);
        assert_eq!(out.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let out = ProcessStepRunner::new().run(&step("fail", &["false"])).await;
        assert!(!out.ok);
        assert_eq!(out.exit_code, Some(1));
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let out = ProcessStepRunner::new()
            .run(&step("both", &["sh", "-c", "echo out; echo err >&2; exit 3"]))
            .await;

        assert!(!out.ok);
        assert_eq!(out.exit_code, Some(3));
        assert!(out.output.contains("out"));
        assert!(out.output.contains("err"));
    }

    #[tokio::test]
    async fn test_missing_executable_is_failure() {
        let out = ProcessStepRunner::new()
            .run(&step("ghost", &["conveyor-definitely-not-a-real-binary"]))
            .await;

        assert!(!out.ok);
        assert_eq!(out.exit_code, None);
        assert!(out.output.contains("failed to start"));
    }

    #[tokio::test]
    async fn test_empty_command_is_failure() {
        let out = ProcessStepRunner::new().run(&step("empty", &[])).await;
        assert!(!out.ok);
        assert_eq!(out.exit_code, None);
    }

    #[tokio::test]
    async fn test_work_dir_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessStepRunner::with_work_dir(dir.path());

        let out = runner.run(&step("touch", &["touch", "marker"])).await;
        assert!(out.ok);
        assert!(dir.path().join("marker").exists());
    }
}
