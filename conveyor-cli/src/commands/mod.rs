//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod build;

pub use build::BuildCommands;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use conveyor_client::OrchestratorClient;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build management
    Build {
        #[command(subcommand)]
        command: BuildCommands,
    },
    /// Check that the orchestrator is reachable
    Health,
}

/// Route a command to its handler module
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Build { command } => build::handle_build_command(command, config).await,
        Commands::Health => check_health(config).await,
    }
}

async fn check_health(config: &Config) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);

    client
        .health()
        .await
        .with_context(|| format!("Orchestrator at {} is not healthy", config.orchestrator_url))?;

    println!(
        "{} Orchestrator at {} is healthy",
        "✓".green(),
        config.orchestrator_url
    );
    Ok(())
}
