//! Pipeline domain types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single named step of a pipeline
///
/// The first element of `command` is the executable, the rest are its arguments.
/// On disk the command vector is written as `cmd`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub name: String,
    #[serde(alias = "cmd")]
    pub command: Vec<String>,
}

impl PipelineStep {
    pub fn new(name: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command,
        }
    }

    /// The executable to spawn, if the command is non-empty
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    /// Arguments passed to the executable
    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or(&[])
    }

    /// Checks the step can be executed, `index` is only used for the error
    pub fn validate(&self, index: usize) -> Result<(), DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::EmptyName { index });
        }

        match self.program() {
            Some(program) if !program.is_empty() => Ok(()),
            _ => Err(DefinitionError::EmptyCommand {
                index,
                name: self.name.clone(),
            }),
        }
    }
}

/// Ordered, immutable sequence of steps executed by one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineDefinition {
    steps: Vec<PipelineStep>,
}

impl PipelineDefinition {
    /// Builds a definition after validating every step
    pub fn new(steps: Vec<PipelineStep>) -> Result<Self, DefinitionError> {
        for (index, step) in steps.iter().enumerate() {
            step.validate(index)?;
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Reasons a pipeline definition is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("step {index} has an empty name")]
    EmptyName { index: usize },

    #[error("step {index} ('{name}') has an empty command")]
    EmptyCommand { index: usize, name: String },
}
