//! Orchestrator configuration
//!
//! Settings are read from environment variables with defaults suitable for
//! local development.

use std::path::PathBuf;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// YAML pipeline definition, re-read on every trigger
    pub pipeline_file: PathBuf,

    /// Working directory for step processes (None = server's cwd)
    pub work_dir: Option<PathBuf>,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - CONVEYOR_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - CONVEYOR_PIPELINE_FILE (optional, default: config.yaml)
    /// - CONVEYOR_WORK_DIR (optional)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: lookup("CONVEYOR_BIND_ADDR").unwrap_or(defaults.bind_addr),
            pipeline_file: lookup("CONVEYOR_PIPELINE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.pipeline_file),
            work_dir: lookup("CONVEYOR_WORK_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.pipeline_file.as_os_str().is_empty() {
            anyhow::bail!("pipeline_file cannot be empty");
        }

        if let Some(dir) = &self.work_dir {
            if !dir.is_dir() {
                anyhow::bail!("work_dir {} is not a directory", dir.display());
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            pipeline_file: PathBuf::from("config.yaml"),
            work_dir: None,
        }
    }
}
