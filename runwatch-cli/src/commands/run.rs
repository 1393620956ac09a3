//! Run command handlers
//!
//! Handles submitting, listing, inspecting and cancelling runs, and
//! hands `watch` off to the watch module.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use runwatch_client::RunServiceClient;
use runwatch_core::domain::log::{LogEntry, LogLevel};
use runwatch_core::domain::run::Run;
use runwatch_core::dto::run::{RunSummary, SubmitRun};
use runwatch_core::status;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use super::watch::{self, WatchArgs};
use crate::config::Config;
use crate::id_resolver::{resolve_run_id, resolve_run_ids};
use crate::types::IdOrPrefix;

/// Run subcommands
#[derive(Subcommand)]
pub enum RunCommands {
    /// Submit a new run
    Submit {
        /// Run name
        #[arg(short, long)]
        name: String,

        /// Path to a script file to execute
        #[arg(short, long)]
        script: Option<String>,

        /// Parameters as key=value pairs (e.g., branch=main)
        #[arg(short, long, value_parser = parse_key_val)]
        param: Vec<(String, String)>,

        /// Keep watching the run until it finishes
        #[arg(short, long)]
        watch: bool,

        #[command(flatten)]
        watch_args: WatchArgs,
    },
    /// List all runs
    List,
    /// Get run details
    Get {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Get run logs
    Logs {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Ask the service to cancel a run
    Cancel {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Wait for one or more runs to finish
    Watch {
        /// Run IDs or unambiguous prefixes
        #[arg(required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        watch_args: WatchArgs,
    },
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((key.to_string(), value.to_string()))
}

/// Handle run commands
pub async fn handle_run_command(command: RunCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        RunCommands::Submit {
            name,
            script,
            param,
            watch: follow,
            watch_args,
        } => {
            let run = submit_run(&client, name, script, param).await?;
            if follow {
                watch::watch_runs(&client, vec![run.id], &watch_args, config).await
            } else {
                Ok(())
            }
        }
        RunCommands::List => list_runs(&client).await,
        RunCommands::Get { id } => get_run(&client, &id).await,
        RunCommands::Logs { id } => get_run_logs(&client, &id).await,
        RunCommands::Cancel { id } => cancel_run(&client, &id).await,
        RunCommands::Watch { ids, watch_args } => {
            let ids = resolve_run_ids(&client, &ids).await?;
            watch::watch_runs(&client, ids, &watch_args, config).await
        }
    }
}

/// Submit a new run
async fn submit_run(
    client: &RunServiceClient,
    name: String,
    script_path: Option<String>,
    params: Vec<(String, String)>,
) -> Result<Run> {
    let script = script_path
        .map(|path| {
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read script file: {}", path))
        })
        .transpose()?;

    let parameters: HashMap<String, JsonValue> = params
        .into_iter()
        .map(|(k, v)| (k, JsonValue::String(v)))
        .collect();

    let run = client
        .submit_run(SubmitRun {
            name,
            script,
            parameters,
        })
        .await?;

    println!("{}", "✓ Run submitted successfully!".green().bold());
    println!("  Run ID:    {}", run.id.to_string().cyan());
    println!("  Name:      {}", run.name.bold());
    println!("  Status:    {}", colorize_status(run.status.as_str()));
    println!(
        "  Submitted: {}",
        run.submitted_at.format("%Y-%m-%d %H:%M:%S")
    );

    Ok(run)
}

/// List all runs
async fn list_runs(client: &RunServiceClient) -> Result<()> {
    let runs = client.list_runs().await?;

    if runs.is_empty() {
        println!("{}", "No runs found.".yellow());
    } else {
        println!("{}", format!("Found {} run(s):", runs.len()).bold());
        println!();
        for run in runs {
            print_run_summary(&run);
        }
    }

    Ok(())
}

/// Get and display a single run
async fn get_run(client: &RunServiceClient, id: &str) -> Result<()> {
    let uuid = resolve_run_id(client, &IdOrPrefix::parse(id)?).await?;

    let run = client.get_run(uuid).await?;

    print_run_details(&run);

    Ok(())
}

/// Get and display run logs
async fn get_run_logs(client: &RunServiceClient, id: &str) -> Result<()> {
    let uuid = resolve_run_id(client, &IdOrPrefix::parse(id)?).await?;

    let logs = client.get_run_logs(uuid).await?;

    if logs.is_empty() {
        println!("{}", "No logs found for this run.".yellow());
    } else {
        println!("{}", format!("Logs for run {}:", uuid).bold());
        println!("{}", "─".repeat(80).dimmed());
        for log in logs {
            print_log_entry(&log);
        }
        println!("{}", "─".repeat(80).dimmed());
    }

    Ok(())
}

/// Request cancellation of a run
async fn cancel_run(client: &RunServiceClient, id: &str) -> Result<()> {
    let uuid = resolve_run_id(client, &IdOrPrefix::parse(id)?).await?;

    client.cancel_run(uuid).await?;

    println!(
        "{}",
        format!("✓ Cancellation requested for run {}", uuid)
            .green()
            .bold()
    );
    println!(
        "{}",
        format!("  Follow it with: runwatch run watch {}", uuid).dimmed()
    );

    Ok(())
}

/// Print a one-entry run summary
fn print_run_summary(run: &RunSummary) {
    println!("  {} {}", "▸".cyan(), run.name.bold());
    println!("    ID:        {}", run.id.to_string().dimmed());
    println!("    Status:    {}", colorize_status(run.status.as_str()));
    println!(
        "    Submitted: {}",
        run.submitted_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

/// Print detailed run information
pub(crate) fn print_run_details(run: &Run) {
    println!("{}", "Run Details:".bold());
    println!("  ID:        {}", run.id.to_string().cyan());
    println!("  Name:      {}", run.name.bold());
    println!("  Status:    {}", colorize_status(run.status.as_str()));
    println!(
        "  Submitted: {}",
        run.submitted_at.format("%Y-%m-%d %H:%M:%S")
    );

    if let Some(started) = run.started_at {
        println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(finished) = run.finished_at {
        println!("  Finished:  {}", finished.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(duration) = run.duration() {
        println!("  Duration:  {}s", duration.num_seconds());
    }

    if !run.parameters.is_empty() {
        println!("\n{}", "Parameters:".bold());
        for (key, value) in &run.parameters {
            println!("  {} = {}", key.cyan(), value);
        }
    }

    if let Some(message) = &run.message {
        println!("\n{}", "Message:".bold());
        if status::is_success(run.status.as_str()) {
            println!("{}", message);
        } else {
            println!("{}", message.red());
        }
    }
}

/// Print a log entry
fn print_log_entry(log: &LogEntry) {
    let label = log.level.label();
    let level_colored = match log.level {
        LogLevel::Debug => label.dimmed(),
        LogLevel::Info => label.cyan(),
        LogLevel::Warning => label.yellow(),
        LogLevel::Error => label.red(),
    };
    let stream = if log.is_stderr() {
        " stderr".dimmed()
    } else {
        "".normal()
    };

    println!(
        "{} [{}{}] {}",
        log.timestamp.format("%H:%M:%S").to_string().dimmed(),
        level_colored,
        stream,
        log.message
    );
}

/// Colorize a run status for display
pub(crate) fn colorize_status(run_status: &str) -> ColoredString {
    match run_status {
        status::DONE => run_status.green(),
        status::FAILED => run_status.red(),
        status::RUNNING => run_status.cyan(),
        status::QUEUED => run_status.yellow(),
        other if status::is_cancellation(other) => other.dimmed(),
        other => other.normal(),
    }
}
