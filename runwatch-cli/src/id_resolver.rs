//! ID resolver module
//!
//! Handles resolution of UUID prefixes to full UUIDs by querying the run
//! service. This allows users to type short, unambiguous prefixes instead of
//! full UUIDs.

use anyhow::{Context, Result, anyhow};
use runwatch_client::RunServiceClient;
use uuid::Uuid;

use crate::types::IdOrPrefix;

/// Resolve a run ID or prefix to a full UUID
///
/// If the input is already a full UUID, returns it without a request.
/// Otherwise, lists all runs and finds the one matching the prefix.
///
/// # Errors
/// Returns an error if:
/// - No run matches the prefix
/// - Multiple runs match the prefix (ambiguous)
/// - API call fails
pub async fn resolve_run_id(client: &RunServiceClient, id_or_prefix: &IdOrPrefix) -> Result<Uuid> {
    if let IdOrPrefix::Full(uuid) = id_or_prefix {
        return Ok(*uuid);
    }

    let runs = client
        .list_runs()
        .await
        .context("Failed to fetch runs for ID resolution")?;

    pick_unique(runs.iter().map(|r| r.id), id_or_prefix)
}

/// Resolve several inputs, failing on the first that does not resolve
pub async fn resolve_run_ids(client: &RunServiceClient, inputs: &[String]) -> Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(inputs.len());
    for input in inputs {
        ids.push(resolve_run_id(client, &IdOrPrefix::parse(input)?).await?);
    }
    Ok(ids)
}

fn pick_unique(ids: impl Iterator<Item = Uuid>, id_or_prefix: &IdOrPrefix) -> Result<Uuid> {
    let matches: Vec<Uuid> = ids.filter(|id| id_or_prefix.matches(id)).collect();

    match matches.as_slice() {
        [] => Err(anyhow!(
            "No run found with ID starting with '{}'",
            id_or_prefix
        )),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(|id| id.to_string()).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple runs: {}",
                id_or_prefix,
                ids.join(", ")
            ))
        }
    }
}
