//! Watch command
//!
//! Follows runs until they finish and turns the poll outcome into command
//! output and exit status:
//! - a run that ends `Done` succeeds
//! - a run that ends in any other terminal status, a failed first status
//!   check, or a timeout is a command failure
//! - Ctrl-C prints the last known status and exits cleanly, since the run
//!   itself keeps going on the service

use anyhow::{Result, bail};
use clap::Args;
use colored::*;
use runwatch_client::{RunFetcher, RunServiceClient};
use runwatch_core::domain::run::Run;
use runwatch_core::status;
use runwatch_poller::{
    InterruptGuard, PollError, PollPolicy, PollResult, PollSession, Reporter, WatchOutcome,
    WatchSet,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::run::{colorize_status, print_run_details};
use crate::config::Config;

/// Polling flags shared by `watch` and `submit --watch`
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Seconds between status checks
    #[arg(
        long,
        env = "RUNWATCH_POLL_INTERVAL",
        default_value = "5",
        value_parser = parse_seconds
    )]
    pub interval: Duration,

    /// Stop waiting after this many seconds (0 waits until the run finishes)
    #[arg(
        long,
        env = "RUNWATCH_TIMEOUT",
        default_value = "0",
        value_parser = parse_seconds
    )]
    pub timeout: Duration,

    /// Don't print elapsed-time progress lines
    #[arg(long)]
    pub no_progress: bool,
}

impl WatchArgs {
    /// Builds and validates the poll policy for these flags
    pub fn policy(&self, debug: bool) -> Result<PollPolicy> {
        let policy = PollPolicy::new(self.interval)
            .with_max_duration(self.timeout)
            .with_progress(!self.no_progress)
            .with_debug(debug);
        policy.validate()?;
        Ok(policy)
    }
}

/// Parse a (possibly fractional) number of seconds
fn parse_seconds(s: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number of seconds", s))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration `{}`: {}", s, e))
}

/// Watch one or more runs until they finish
pub async fn watch_runs(
    client: &RunServiceClient,
    ids: Vec<Uuid>,
    args: &WatchArgs,
    config: &Config,
) -> Result<()> {
    let policy = args.policy(config.debug)?;
    debug!(
        "Watching {} run(s) every {:?} (limit: {:?})",
        ids.len(),
        policy.interval(),
        policy.max_duration()
    );
    let interrupts = InterruptGuard::install();

    match ids.as_slice() {
        [id] => watch_one(client, *id, policy, &interrupts).await,
        _ => watch_many(client, ids, policy, &interrupts).await,
    }
}

async fn watch_one(
    client: &RunServiceClient,
    id: Uuid,
    policy: PollPolicy,
    interrupts: &InterruptGuard,
) -> Result<()> {
    println!(
        "{} {} {}",
        "Watching run".bold(),
        id.to_string().cyan(),
        "(Ctrl-C to stop)".dimmed()
    );

    let tracker = StatusTracker::default();
    let session =
        PollSession::new(policy, interrupts.token()).with_reporter(TerminalReporter::new(None));

    let result = session
        .run(RunFetcher::new(client.clone(), id), |run: &Run| {
            tracker.observe(run);
        })
        .await;

    report_single(id, result)
}

async fn watch_many(
    client: &RunServiceClient,
    ids: Vec<Uuid>,
    policy: PollPolicy,
    interrupts: &InterruptGuard,
) -> Result<()> {
    println!(
        "{} {} {}",
        "Watching".bold(),
        format!("{} runs", ids.len()).cyan(),
        "(Ctrl-C to stop)".dimmed()
    );

    let mut set = WatchSet::<Uuid, RunFetcher>::new()
        .with_reporter_factory(|id: &Uuid| -> Box<dyn Reporter> {
            Box::new(TerminalReporter::new(Some(short_id(*id))))
        });
    for id in ids {
        set.add(id, RunFetcher::new(client.clone(), id));
    }

    let tracker = Arc::new(StatusTracker::labelled());
    let outcomes = set
        .run(policy, interrupts.token(), move |_: &Uuid, run: &Run| {
            tracker.observe(run);
        })
        .await;

    summarize(&outcomes)
}

fn report_single(id: Uuid, result: PollResult<Run>) -> Result<()> {
    match result {
        Ok(run) => {
            println!();
            print_run_details(&run);
            println!();
            if status::is_success(run.status.as_str()) {
                println!("{}", "✓ Run finished successfully".green().bold());
                Ok(())
            } else {
                bail!("Run {} finished with status {}", run.id, run.status)
            }
        }
        Err(PollError::Interrupted { last }) => {
            println!();
            println!(
                "{}",
                "⚠ Stopped watching before the run finished".yellow().bold()
            );
            println!("  Run ID:      {}", last.id.to_string().cyan());
            println!("  Last status: {}", colorize_status(last.status.as_str()));
            println!(
                "{}",
                format!(
                    "  The run continues on the service. Resume with: runwatch run watch {}",
                    last.id
                )
                .dimmed()
            );
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to watch run {}", id))),
    }
}

/// Prints a per-run summary; fails if any run did not finish successfully
///
/// Interrupted runs are reported but do not count as failures.
fn summarize(outcomes: &[WatchOutcome<Uuid, Run>]) -> Result<()> {
    println!();
    println!("{}", "Summary:".bold());

    let mut failed = 0;
    for outcome in outcomes {
        let label = short_id(outcome.key);
        match &outcome.result {
            Ok(run) if status::is_success(run.status.as_str()) => {
                println!("  {} {} {}", "✓".green(), label, colorize_status(run.status.as_str()));
            }
            Ok(run) => {
                failed += 1;
                println!("  {} {} {}", "✗".red(), label, colorize_status(run.status.as_str()));
            }
            Err(PollError::Interrupted { last }) => {
                println!(
                    "  {} {} last seen {}",
                    "⚠".yellow(),
                    label,
                    colorize_status(last.status.as_str())
                );
            }
            Err(e) => {
                failed += 1;
                println!("  {} {} {}", "✗".red(), label, e.to_string().red());
            }
        }
    }

    if failed > 0 {
        bail!(
            "{} of {} run(s) did not finish successfully",
            failed,
            outcomes.len()
        );
    }

    Ok(())
}

fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

/// Prints a line whenever a run's status changes
#[derive(Default)]
struct StatusTracker {
    labelled: bool,
    seen: Mutex<HashMap<Uuid, String>>,
}

impl StatusTracker {
    /// Tracker whose lines start with a short run id
    fn labelled() -> Self {
        Self {
            labelled: true,
            ..Self::default()
        }
    }

    /// Returns true if the status changed since the last snapshot
    fn observe(&self, run: &Run) -> bool {
        let current = run.status.as_str();
        let previous = {
            let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
            seen.insert(run.id, current.to_string())
        };

        if previous.as_deref() == Some(current) {
            return false;
        }

        let prefix = if self.labelled {
            format!("[{}] ", short_id(run.id))
        } else {
            String::new()
        };

        match previous {
            Some(previous) => println!(
                "  {}{} {} {}",
                prefix,
                colorize_status(&previous),
                "→".dimmed(),
                colorize_status(current)
            ),
            None => println!(
                "  {}{} {}",
                prefix,
                "Status:".dimmed(),
                colorize_status(current)
            ),
        }

        true
    }
}

/// Writes progress and retry diagnostics to stderr
struct TerminalReporter {
    label: Option<String>,
}

impl TerminalReporter {
    fn new(label: Option<String>) -> Self {
        Self { label }
    }

    fn prefix(&self) -> String {
        self.label
            .as_ref()
            .map(|label| format!("[{}] ", label))
            .unwrap_or_default()
    }
}

impl Reporter for TerminalReporter {
    fn progress(&mut self, line: &str) {
        eprintln!("  {}{}", self.prefix(), line.dimmed());
    }

    fn transient_error(&mut self, attempt: u32, error: &anyhow::Error) {
        eprintln!(
            "  {}{} status check {} failed, retrying: {:#}",
            self.prefix(),
            "⚠".yellow(),
            attempt,
            error
        );
    }
}
