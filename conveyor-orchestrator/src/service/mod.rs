//! Service Module
//!
//! Business logic layer for the orchestrator.
//! The step runner executes single commands, the executor drives one build's
//! steps, and the build service ties both to the status repository.

pub mod build;
pub mod executor;
pub mod step_runner;

// Re-export for convenience
pub use build::{BuildError, BuildIdGenerator, BuildOrchestrator, UuidGenerator};
pub use executor::PipelineExecutor;
pub use step_runner::{ProcessStepRunner, StepOutput, StepRunner};
