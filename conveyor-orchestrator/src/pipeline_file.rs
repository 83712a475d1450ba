//! Pipeline file loading
//!
//! Reads the YAML pipeline definition served to every triggered build:
//!
//! ```yaml
//! pipeline:
//!   - name: compile
//!     cmd: ["cargo", "build"]
//!   - name: test
//!     cmd: ["cargo", "test"]
//! ```

use conveyor_core::domain::pipeline::{DefinitionError, PipelineDefinition, PipelineStep};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineFileError {
    #[error("failed to read pipeline file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid pipeline in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: DefinitionError,
    },
}

/// On-disk layout of the pipeline file
#[derive(Debug, Deserialize)]
struct PipelineFile {
    #[serde(default)]
    pipeline: Vec<PipelineStep>,
}

/// Read, parse and validate the pipeline file at `path`
pub async fn load_pipeline_file(path: &Path) -> Result<PipelineDefinition, PipelineFileError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PipelineFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let definition = parse_pipeline(&contents).map_err(|e| match e {
        ParseFailure::Yaml(source) => PipelineFileError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Definition(source) => PipelineFileError::Invalid {
            path: path.to_path_buf(),
            source,
        },
    })?;

    tracing::debug!(
        "Loaded pipeline with {} step(s) from {}",
        definition.len(),
        path.display()
    );

    Ok(definition)
}

enum ParseFailure {
    Yaml(serde_yaml::Error),
    Definition(DefinitionError),
}

fn parse_pipeline(contents: &str) -> Result<PipelineDefinition, ParseFailure> {
    let file: PipelineFile = serde_yaml::from_str(contents).map_err(ParseFailure::Yaml)?;
    PipelineDefinition::new(file.pipeline).map_err(ParseFailure::Definition)
}
