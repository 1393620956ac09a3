//! Runwatch Poller
//!
//! Tracks a single submitted run until it reaches a terminal status.
//!
//! A [`PollSession`] fetches the run once immediately, then again on every
//! interval tick, until one of the following happens:
//! - the run reports a terminal status (success)
//! - the first fetch fails ([`PollError::HardFailure`])
//! - the policy's maximum duration elapses ([`PollError::Timeout`])
//! - the injected cancellation token fires ([`PollError::Interrupted`])
//!
//! Fetch failures after the first are treated as transient and retried on the
//! next tick. Several runs are tracked at once with a [`WatchSet`], which runs
//! one session per run.

pub mod error;
pub mod fetcher;
pub mod policy;
pub mod progress;
pub mod session;
pub mod signal;
pub mod watch_set;

pub use error::{PollError, PollResult};
pub use fetcher::{FetchContext, FnFetcher, SnapshotFetcher, fetch_fn};
pub use policy::{PolicyError, PollPolicy};
pub use progress::{NullReporter, Reporter, StderrReporter, format_elapsed, format_progress};
pub use session::PollSession;
pub use signal::InterruptGuard;
pub use watch_set::{WatchOutcome, WatchSet};

pub use runwatch_core::status::{Snapshot, StatusClass, classify, is_terminal};
pub use tokio_util::sync::CancellationToken;
