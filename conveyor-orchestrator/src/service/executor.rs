//! Pipeline executor
//!
//! Runs the steps of one build in order and records progress in the status
//! store. Execution stops at the first failing step.

use conveyor_core::domain::build::BuildPhase;
use conveyor_core::domain::log::LogEntry;
use conveyor_core::domain::pipeline::PipelineDefinition;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::repository::{StatusStore, StoreError};
use crate::service::step_runner::StepRunner;

/// Runs pipeline definitions against the status store
pub struct PipelineExecutor {
    runner: Arc<dyn StepRunner>,
    store: Arc<StatusStore>,
}

impl PipelineExecutor {
    pub fn new(runner: Arc<dyn StepRunner>, store: Arc<StatusStore>) -> Self {
        Self { runner, store }
    }

    /// Executes `definition` for `build_id` and returns the terminal phase
    ///
    /// The record must exist in the Pending phase. Every write goes through
    /// the store; an error here means the record was missing or already
    /// moved by someone else.
    pub async fn execute(
        &self,
        build_id: &str,
        definition: &PipelineDefinition,
    ) -> Result<BuildPhase, StoreError> {
        info!(
            "Starting build {} ({} step(s))",
            build_id,
            definition.len()
        );

        self.store.set_phase(build_id, BuildPhase::InProgress)?;

        for (idx, step) in definition.steps().iter().enumerate() {
            info!(
                "Build {}: executing step {}/{}: {}",
                build_id,
                idx + 1,
                definition.len(),
                step.name
            );

            let result = self.runner.run(step).await;

            if !result.ok {
                warn!(
                    "Build {}: step '{}' failed (exit code {:?})",
                    build_id, step.name, result.exit_code
                );
                debug!("Output of step {}: {}", step.name, result.output);

                self.store.update(
                    build_id,
                    BuildPhase::Failed,
                    LogEntry::error(format!("Step {} failed: {}", step.name, result.output)),
                )?;
                return Ok(BuildPhase::Failed);
            }

            debug!("Output of step {}: {}", step.name, result.output);

            self.store.update(
                build_id,
                BuildPhase::InProgress,
                LogEntry::info(format!("Step {} completed successfully", step.name)),
            )?;
        }

        self.store.update(
            build_id,
            BuildPhase::Success,
            LogEntry::info(format!(
                "Pipeline completed with status: {}",
                BuildPhase::Success
            )),
        )?;

        info!("Build {} completed successfully", build_id);
        Ok(BuildPhase::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::step_runner::{ProcessStepRunner, StepOutput};
    use async_trait::async_trait;
    use conveyor_core::domain::log::LogLevel;
    use conveyor_core::domain::pipeline::PipelineStep;
    use std::sync::Mutex;

    fn step(name: &str, cmd: &[&str]) -> PipelineStep {
        PipelineStep::new(name, cmd.iter().map(|s| s.to_string()).collect())
    }

    fn definition(steps: Vec<PipelineStep>) -> PipelineDefinition {
        PipelineDefinition::new(steps).unwrap()
    }

    /// Succeeds for every step except those named in `failing`, and records call order
    struct ScriptedRunner {
        failing: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn failing_on(names: &[&str]) -> Self {
            Self {
                failing: names.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StepRunner for ScriptedRunner {
        async fn run(&self, step: &PipelineStep) -> StepOutput {
            self.calls.lock().unwrap().push(step.name.clone());
            let ok = !self.failing.contains(&step.name);
            StepOutput {
                output: format!("output of {}", step.name),
                ok,
                exit_code: Some(if ok { 0 } else { 1 }),
            }
        }
    }

    fn setup(runner: Arc<dyn StepRunner>) -> (Arc<StatusStore>, PipelineExecutor) {
        let store = Arc::new(StatusStore::new());
        let executor = PipelineExecutor::new(runner, Arc::clone(&store));
        (store, executor)
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let runner = Arc::new(ScriptedRunner::failing_on(&[]));
        let (store, executor) = setup(runner.clone());
        store.create("b1").unwrap();

        let def = definition(vec![
            step("compile", &["x"]),
            step("test", &["x"]),
            step("deploy", &["x"]),
        ]);
        let phase = executor.execute("b1", &def).await.unwrap();

        assert_eq!(phase, BuildPhase::Success);
        assert_eq!(runner.calls(), vec!["compile", "test", "deploy"]);

        let status = store.get("b1").unwrap();
        assert_eq!(status.phase, BuildPhase::Success);
        assert_eq!(status.log.len(), def.len() + 1);
        assert!(status.log[0].message.contains("compile"));
        assert!(status.log[1].message.contains("test"));
        assert!(status.log[2].message.contains("deploy"));
        assert_eq!(
            status.log[3].message,
            "Pipeline completed with status: Success"
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let runner = Arc::new(ScriptedRunner::failing_on(&["test"]));
        let (store, executor) = setup(runner.clone());
        store.create("b1").unwrap();

        let def = definition(vec![
            step("compile", &["x"]),
            step("test", &["x"]),
            step("deploy", &["x"]),
        ]);
        let phase = executor.execute("b1", &def).await.unwrap();

        assert_eq!(phase, BuildPhase::Failed);
        assert_eq!(runner.calls(), vec!["compile", "test"]);

        let status = store.get("b1").unwrap();
        assert_eq!(status.phase, BuildPhase::Failed);
        assert_eq!(status.log.len(), 2);

        let last = status.log.last().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert!(last.message.contains("test"));
        assert!(last.message.contains("output of test"));
    }

    #[tokio::test]
    async fn test_failure_entry_count_for_every_position() {
        let names = ["s0", "s1", "s2", "s3", "s4"];

        for k in 0..names.len() {
            let runner = Arc::new(ScriptedRunner::failing_on(&[names[k]]));
            let (store, executor) = setup(runner.clone());
            store.create("b").unwrap();

            let def = definition(names.iter().map(|n| step(n, &["x"])).collect());
            let phase = executor.execute("b", &def).await.unwrap();

            assert_eq!(phase, BuildPhase::Failed);
            let status = store.get("b").unwrap();
            assert_eq!(status.log.len(), k + 1);
            assert!(status.log[k].message.contains(names[k]));
            assert_eq!(runner.calls().len(), k + 1);
        }
    }

    #[tokio::test]
    async fn test_empty_pipeline_succeeds_with_summary_only() {
        let (store, executor) = setup(Arc::new(ScriptedRunner::failing_on(&[])));
        store.create("b1").unwrap();

        let phase = executor
            .execute("b1", &PipelineDefinition::default())
            .await
            .unwrap();

        assert_eq!(phase, BuildPhase::Success);
        assert_eq!(store.get("b1").unwrap().log.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_build_is_an_error() {
        let (_store, executor) = setup(Arc::new(ScriptedRunner::failing_on(&[])));
        let def = definition(vec![step("a", &["x"])]);

        let err = executor.execute("missing", &def).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("missing".to_string()));
    }

    #[tokio::test]
    async fn test_finished_build_cannot_be_rerun() {
        let (store, executor) = setup(Arc::new(ScriptedRunner::failing_on(&[])));
        store.create("b1").unwrap();
        let def = definition(vec![step("a", &["x"])]);

        executor.execute("b1", &def).await.unwrap();
        let err = executor.execute("b1", &def).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
        assert_eq!(store.get("b1").unwrap().log.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_step_skips_later_processes() {
        let dir = tempfile::tempdir().unwrap();
        let sentinel = dir.path().join("deployed");
        let sentinel_str = sentinel.to_string_lossy().to_string();

        let (store, executor) = setup(Arc::new(ProcessStepRunner::new()));
        store.create("b1").unwrap();

        let def = definition(vec![
            step("compile", &["true"]),
            step("test", &["false"]),
            step("deploy", &["touch", &sentinel_str]),
        ]);
        let phase = executor.execute("b1", &def).await.unwrap();

        assert_eq!(phase, BuildPhase::Failed);
        assert!(!sentinel.exists());

        let status = store.get("b1").unwrap();
        assert_eq!(status.log.len(), 2);
        assert!(status.log[1].message.starts_with("Step test failed"));
    }

    #[tokio::test]
    async fn test_single_real_step_success() {
        let (store, executor) = setup(Arc::new(ProcessStepRunner::new()));
        store.create("b1").unwrap();

        let def = definition(vec![step("build", &["true"])]);
        let phase = executor.execute("b1", &def).await.unwrap();

        assert_eq!(phase, BuildPhase::Success);
        let status = store.get("b1").unwrap();
        assert_eq!(status.phase, BuildPhase::Success);
        assert_eq!(status.log.len(), 2);
    }
}
