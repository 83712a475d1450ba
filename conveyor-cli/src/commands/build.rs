//! Build command handlers
//!
//! Triggering builds, viewing their status and logs, and waiting for them to finish.

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;
use conveyor_client::OrchestratorClient;
use conveyor_core::domain::build::BuildPhase;
use conveyor_core::domain::log::{LogEntry, LogLevel};
use conveyor_core::dto::build::{BuildStatusResponse, BuildSummary};
use std::time::Duration;

use crate::config::Config;
use crate::id_resolver::resolve_build_id;

/// Build subcommands
#[derive(Subcommand)]
pub enum BuildCommands {
    /// Trigger a build of the server's pipeline
    Trigger {
        /// Wait for the build to finish
        #[arg(short, long)]
        wait: bool,

        /// Poll interval in milliseconds when waiting
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Give up waiting after this many seconds
        #[arg(long, default_value_t = 3600)]
        timeout_secs: u64,
    },
    /// Show the status of a build
    Status {
        /// Build ID or unambiguous prefix
        id: String,
    },
    /// Show the log entries of a build
    Logs {
        /// Build ID or unambiguous prefix
        id: String,
    },
    /// Wait until a build succeeds or fails
    Wait {
        /// Build ID or unambiguous prefix
        id: String,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 3600)]
        timeout_secs: u64,
    },
    /// List all builds
    List,
}

/// Handle build commands
pub async fn handle_build_command(command: BuildCommands, config: &Config) -> Result<()> {
    let client = OrchestratorClient::new(&config.orchestrator_url);

    match command {
        BuildCommands::Trigger {
            wait,
            interval_ms,
            timeout_secs,
        } => trigger_build(&client, wait, interval_ms, timeout_secs).await,
        BuildCommands::Status { id } => show_status(&client, &id).await,
        BuildCommands::Logs { id } => show_logs(&client, &id).await,
        BuildCommands::Wait {
            id,
            interval_ms,
            timeout_secs,
        } => {
            let id = resolve_build_id(&client, &id).await?;
            wait_for_build(&client, &id, interval_ms, timeout_secs).await
        }
        BuildCommands::List => list_builds(&client).await,
    }
}

async fn trigger_build(
    client: &OrchestratorClient,
    wait: bool,
    interval_ms: u64,
    timeout_secs: u64,
) -> Result<()> {
    let triggered = client.trigger_build().await?;

    println!("{} {}", "✓".green(), triggered.message.bold());
    println!("  ID: {}", triggered.id.cyan());

    if wait {
        println!();
        wait_for_build(client, &triggered.id, interval_ms, timeout_secs).await?;
    }

    Ok(())
}

async fn show_status(client: &OrchestratorClient, id: &str) -> Result<()> {
    let id = resolve_build_id(client, id).await?;
    let status = client.get_status(&id).await?;

    print_build_details(&status);
    Ok(())
}

async fn show_logs(client: &OrchestratorClient, id: &str) -> Result<()> {
    let id = resolve_build_id(client, id).await?;
    let logs = client.get_logs(&id).await?;

    if logs.is_empty() {
        println!("{}", "No logs yet for this build.".yellow());
    } else {
        println!("{}", format!("Logs for build {}:", id).bold());
        println!("{}", "─".repeat(80).dimmed());
        for entry in &logs {
            print_log_entry(entry);
        }
        println!("{}", "─".repeat(80).dimmed());
    }

    Ok(())
}

async fn wait_for_build(
    client: &OrchestratorClient,
    id: &str,
    interval_ms: u64,
    timeout_secs: u64,
) -> Result<()> {
    println!("{}", format!("Waiting for build {}...", id).dimmed());

    let status = client
        .wait_for_build(
            id,
            Duration::from_millis(interval_ms.max(1)),
            Duration::from_secs(timeout_secs),
        )
        .await?;

    print_build_details(&status);

    if status.status == BuildPhase::Failed {
        bail!("Build {} failed", status.id);
    }
    Ok(())
}

async fn list_builds(client: &OrchestratorClient) -> Result<()> {
    let builds = client.list_builds().await?;

    if builds.is_empty() {
        println!("{}", "No builds found.".yellow());
    } else {
        println!("{}", format!("Found {} build(s):", builds.len()).bold());
        println!();
        for build in &builds {
            print_build_summary(build);
        }
    }

    Ok(())
}

fn print_build_summary(build: &BuildSummary) {
    println!("  {} Build {}", "▸".cyan(), build.id.dimmed());
    println!("    Status:   {}", colorize_status(build.status));
    println!("    Entries:  {}", build.log_entries);
    println!(
        "    Created:  {}",
        build
            .created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

fn print_build_details(status: &BuildStatusResponse) {
    println!("{}", "Build Details:".bold());
    println!("  ID:        {}", status.id.cyan());
    println!("  Status:    {}", colorize_status(status.status));
    println!(
        "  Created:   {}",
        status.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "  Updated:   {}",
        status.updated_at.format("%Y-%m-%d %H:%M:%S")
    );

    if !status.logs.is_empty() {
        println!("\n{}", "Logs:".bold());
        for line in status.logs.lines() {
            println!("  {}", line);
        }
    }
}

fn print_log_entry(entry: &LogEntry) {
    let level_str = format!("{:?}", entry.level).to_uppercase();
    let level_colored = match entry.level {
        LogLevel::Debug => level_str.dimmed(),
        LogLevel::Info => level_str.cyan(),
        LogLevel::Warning => level_str.yellow(),
        LogLevel::Error => level_str.red(),
    };

    println!(
        "{} [{}] {}",
        entry.timestamp.format("%H:%M:%S").to_string().dimmed(),
        level_colored,
        entry.message
    );
}

fn colorize_status(phase: BuildPhase) -> ColoredString {
    let label = phase.as_str();
    match phase {
        BuildPhase::Pending => label.yellow(),
        BuildPhase::InProgress => label.cyan(),
        BuildPhase::Success => label.green(),
        BuildPhase::Failed => label.red(),
    }
}
