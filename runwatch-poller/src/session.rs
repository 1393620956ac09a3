//! Poll session
//!
//! Drives a [`SnapshotFetcher`] until the run it tracks reaches a terminal
//! status, the time budget runs out, or cancellation is requested.
//!
//! Guarantees:
//! - at most one fetch is in flight at any time
//! - the update callback runs once per successful fetch, before that
//!   snapshot's status is checked, and never concurrently with itself
//! - nothing is fetched after `run` returns
//! - the interval timer and deadline timer are dropped on every exit path

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use runwatch_core::status::Snapshot;

use crate::error::{PollError, PollResult};
use crate::fetcher::{FetchContext, SnapshotFetcher};
use crate::policy::PollPolicy;
use crate::progress::{Reporter, StderrReporter, format_progress};

/// Single-use tracker for one run
///
/// Created per tracking attempt and consumed by [`PollSession::run`]. To start
/// over, build a new session.
pub struct PollSession {
    policy: PollPolicy,
    start_time: Instant,
    cancel: CancellationToken,
    reporter: Box<dyn Reporter>,
}

impl PollSession {
    /// Creates a session; the elapsed-time clock starts now
    pub fn new(policy: PollPolicy, cancel: CancellationToken) -> Self {
        Self {
            policy,
            start_time: Instant::now(),
            cancel,
            reporter: Box::new(StderrReporter),
        }
    }

    /// Replaces the default stderr reporter
    pub fn with_reporter(self, reporter: impl Reporter + 'static) -> Self {
        self.with_boxed_reporter(Box::new(reporter))
    }

    pub fn with_boxed_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Polls until a terminal status, timeout, interruption or hard failure
    ///
    /// The first fetch happens immediately. If it fails the session ends with
    /// [`PollError::HardFailure`]; later failures are logged and retried on the
    /// next interval tick. Cancellation and the deadline are only observed
    /// between fetches. A policy that fails [`PollPolicy::validate`] ends the
    /// session with [`PollError::InvalidPolicy`] before anything is fetched.
    pub async fn run<F, U>(self, mut fetcher: F, mut on_update: U) -> PollResult<F::Snapshot>
    where
        F: SnapshotFetcher,
        U: FnMut(&F::Snapshot) + Send,
    {
        let Self {
            policy,
            start_time,
            cancel,
            mut reporter,
        } = self;

        policy.validate()?;

        let deadline = policy.deadline_from(start_time);
        let context = |attempt| FetchContext {
            attempt,
            deadline,
            cancel: cancel.clone(),
        };

        info!(
            "Starting poll session (interval: {:?}, max duration: {:?})",
            policy.interval(),
            policy.max_duration()
        );

        let mut attempt = 1;
        let mut last = match fetcher.fetch(context(attempt)).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Initial fetch failed, not retrying: {:#}", e);
                return Err(PollError::HardFailure(e));
            }
        };

        on_update(&last);

        if last.is_terminal() {
            info!("Run already finished with status {}", last.status());
            return Ok(last);
        }

        let mut ticker = time::interval_at(Instant::now() + policy.interval(), policy.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let expiry = sleep_until(deadline);
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("Poll session interrupted after {} attempt(s)", attempt);
                    return Err(PollError::Interrupted { last });
                }
                _ = &mut expiry => {
                    let elapsed = start_time.elapsed();
                    info!("Poll session timed out after {:?}", elapsed);
                    return Err(PollError::Timeout { elapsed });
                }
                _ = ticker.tick() => {}
            }

            attempt += 1;
            debug!("Fetching run status (attempt {})", attempt);

            let snapshot = match fetcher.fetch(context(attempt)).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    if policy.debug() {
                        warn!("Fetch attempt {} failed, will retry: {:#}", attempt, e);
                        reporter.transient_error(attempt, &e);
                    } else {
                        debug!("Fetch attempt {} failed, will retry: {:#}", attempt, e);
                    }
                    continue;
                }
            };

            on_update(&snapshot);

            if snapshot.is_terminal() {
                info!(
                    "Run reached status {} after {} attempt(s)",
                    snapshot.status(),
                    attempt
                );
                return Ok(snapshot);
            }

            if policy.show_progress() {
                reporter.progress(&format_progress(start_time.elapsed(), snapshot.status()));
            }

            last = snapshot;
        }
    }
}

/// Sleeps until `deadline`, or forever when there is none
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
