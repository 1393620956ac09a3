//! Tracking several runs at once
//!
//! A [`WatchSet`] runs one [`PollSession`] per run on its own task. Sessions
//! share a policy and a cancellation token but keep independent deadlines and
//! failure handling; one run timing out does not affect the others.

use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::{PollError, PollResult};
use crate::fetcher::SnapshotFetcher;
use crate::policy::PollPolicy;
use crate::progress::{Reporter, StderrReporter};
use crate::session::PollSession;

type ReporterFactory<K> = Arc<dyn Fn(&K) -> Box<dyn Reporter> + Send + Sync>;

/// Final result for one run in a [`WatchSet`]
#[derive(Debug)]
pub struct WatchOutcome<K, S: fmt::Debug> {
    pub key: K,
    pub result: PollResult<S>,
}

/// A group of runs polled concurrently
pub struct WatchSet<K, F> {
    entries: Vec<(K, F)>,
    reporter_factory: ReporterFactory<K>,
}

impl<K, F> WatchSet<K, F>
where
    K: Clone + Send + Sync + 'static,
    F: SnapshotFetcher + 'static,
    F::Snapshot: 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            reporter_factory: Arc::new(stderr_reporter::<K>),
        }
    }

    /// Builds the reporter for each run's session
    pub fn with_reporter_factory(
        mut self,
        factory: impl Fn(&K) -> Box<dyn Reporter> + Send + Sync + 'static,
    ) -> Self {
        self.reporter_factory = Arc::new(factory);
        self
    }

    /// Adds a run to track under `key`
    pub fn add(&mut self, key: K, fetcher: F) {
        self.entries.push((key, fetcher));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Polls every run to completion
    ///
    /// `on_update` receives each snapshot along with its run's key. Outcomes
    /// are returned in the order runs were added. Dropping the returned future
    /// aborts every session.
    pub async fn run<U>(
        self,
        policy: PollPolicy,
        cancel: CancellationToken,
        on_update: U,
    ) -> Vec<WatchOutcome<K, F::Snapshot>>
    where
        U: Fn(&K, &F::Snapshot) + Send + Sync + 'static,
    {
        let on_update = Arc::new(on_update);
        let keys: Vec<K> = self.entries.iter().map(|(key, _)| key.clone()).collect();
        let mut results: Vec<Option<PollResult<F::Snapshot>>> =
            keys.iter().map(|_| None).collect();

        info!("Watching {} run(s)", keys.len());

        let mut tasks = JoinSet::new();
        for (index, (key, fetcher)) in self.entries.into_iter().enumerate() {
            let session = PollSession::new(policy.clone(), cancel.clone())
                .with_boxed_reporter((self.reporter_factory)(&key));
            let on_update = Arc::clone(&on_update);

            tasks.spawn(async move {
                let result = session
                    .run(fetcher, |snapshot: &F::Snapshot| on_update(&key, snapshot))
                    .await;
                (index, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => error!("Watch task failed: {}", e),
            }
        }

        keys.into_iter()
            .zip(results)
            .map(|(key, result)| WatchOutcome {
                key,
                result: result.unwrap_or_else(|| {
                    Err(PollError::HardFailure(anyhow::anyhow!(
                        "watch task ended without a result"
                    )))
                }),
            })
            .collect()
    }
}

fn stderr_reporter<K>(_key: &K) -> Box<dyn Reporter> {
    Box::new(StderrReporter)
}

impl<K, F> Default for WatchSet<K, F>
where
    K: Clone + Send + Sync + 'static,
    F: SnapshotFetcher + 'static,
    F::Snapshot: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
