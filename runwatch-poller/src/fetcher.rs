//! Snapshot fetching
//!
//! The poller does not know how a run's state is obtained. Callers hand it a
//! [`SnapshotFetcher`], usually an HTTP call to the run service.

use async_trait::async_trait;
use runwatch_core::status::Snapshot;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Information handed to every fetch
///
/// The session never aborts a fetch in flight. Fetchers that need to give up
/// early can bound themselves with `deadline` or watch `cancel`.
#[derive(Debug, Clone)]
pub struct FetchContext {
    /// 1-based attempt number within the session
    pub attempt: u32,
    /// Session deadline, if the policy has one
    pub deadline: Option<Instant>,
    /// The session's cancellation token
    pub cancel: CancellationToken,
}

impl FetchContext {
    /// Time left before the session deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// True for the unconditional first fetch
    pub fn is_first(&self) -> bool {
        self.attempt == 1
    }
}

/// Source of run snapshots
///
/// Called at most once at a time by a session. Must be safe to call
/// repeatedly.
#[async_trait]
pub trait SnapshotFetcher: Send {
    type Snapshot: Snapshot + fmt::Debug + Send;

    /// Returns the latest snapshot
    async fn fetch(&mut self, ctx: FetchContext) -> anyhow::Result<Self::Snapshot>;
}

/// A [`SnapshotFetcher`] backed by a closure
pub struct FnFetcher<F>(F);

/// Wraps an async closure as a [`SnapshotFetcher`]
///
/// ```
/// use runwatch_poller::{FetchContext, fetch_fn};
///
/// #[derive(Debug)]
/// struct Status(&'static str);
/// impl runwatch_poller::Snapshot for Status {
///     fn status(&self) -> &str {
///         self.0
///     }
/// }
///
/// let fetcher = fetch_fn(|_ctx: FetchContext| async {
///     Ok::<_, anyhow::Error>(Status("Done"))
/// });
/// ```
pub fn fetch_fn<F, Fut, S>(f: F) -> FnFetcher<F>
where
    F: FnMut(FetchContext) -> Fut + Send,
    Fut: Future<Output = anyhow::Result<S>> + Send + 'static,
    S: Snapshot + fmt::Debug + Send + 'static,
{
    FnFetcher(f)
}

#[async_trait]
impl<F, Fut, S> SnapshotFetcher for FnFetcher<F>
where
    F: FnMut(FetchContext) -> Fut + Send,
    Fut: Future<Output = anyhow::Result<S>> + Send + 'static,
    S: Snapshot + fmt::Debug + Send + 'static,
{
    type Snapshot = S;

    async fn fetch(&mut self, ctx: FetchContext) -> anyhow::Result<S> {
        (self.0)(ctx).await
    }
}
