//! ID resolver module
//!
//! Resolves build ID prefixes to full IDs by listing builds on the orchestrator,
//! so users can type a short prefix instead of a whole UUID.

use anyhow::{Context, Result, anyhow};
use conveyor_client::OrchestratorClient;

use crate::types::IdOrPrefix;

/// Resolve a build ID or prefix to a full build ID
///
/// # Errors
/// Returns an error if no build matches, the prefix is ambiguous, or the API call fails.
pub async fn resolve_build_id(client: &OrchestratorClient, input: &str) -> Result<String> {
    let prefix = match IdOrPrefix::parse(input) {
        IdOrPrefix::Full(uuid) => return Ok(uuid.to_string()),
        IdOrPrefix::Prefix(prefix) => prefix,
    };

    let builds = client
        .list_builds()
        .await
        .context("Failed to fetch builds for ID resolution")?;

    match_prefix(builds.iter().map(|b| b.id.as_str()), &prefix)
}

/// Pick the single ID starting with `prefix` (case-insensitive); an exact match always wins
fn match_prefix<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> Result<String> {
    let prefix = prefix.to_lowercase();
    let mut matches = Vec::new();

    for id in ids {
        let lowered = id.to_lowercase();
        if lowered == prefix {
            return Ok(id.to_string());
        }
        if lowered.starts_with(&prefix) {
            matches.push(id.to_string());
        }
    }

    match matches.len() {
        0 => Err(anyhow!("No build found with ID starting with '{}'", prefix)),
        1 => Ok(matches.remove(0)),
        _ => Err(anyhow!(
            "Ambiguous prefix '{}' matches multiple builds: {}",
            prefix,
            matches.join(", ")
        )),
    }
}
