//! Poll session integration

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use runwatch_core::domain::run::Run;
use runwatch_poller::{FetchContext, SnapshotFetcher};
use tracing::debug;
use uuid::Uuid;

use crate::RunServiceClient;

/// Fetches one run's current state for a poll session
///
/// Each request is bounded by whatever is left of the session's time budget
/// and is abandoned as soon as the session's cancellation token fires, so a
/// hung request holds the session neither past its deadline nor past Ctrl-C.
#[derive(Debug, Clone)]
pub struct RunFetcher {
    client: RunServiceClient,
    run_id: Uuid,
}

impl RunFetcher {
    pub fn new(client: RunServiceClient, run_id: Uuid) -> Self {
        Self { client, run_id }
    }
}

#[async_trait]
impl SnapshotFetcher for RunFetcher {
    type Snapshot = Run;

    async fn fetch(&mut self, ctx: FetchContext) -> anyhow::Result<Run> {
        debug!("Fetching run {} (attempt {})", self.run_id, ctx.attempt);

        let request = self
            .client
            .get_run_with_timeout(self.run_id, ctx.remaining());

        tokio::select! {
            _ = ctx.cancel.cancelled() => {
                debug!("Abandoning fetch of run {} after cancellation", self.run_id);
                Err(anyhow!("fetch of run {} was cancelled", self.run_id))
            }
            result = request => {
                result.with_context(|| format!("Failed to fetch run {}", self.run_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{StubService, serve_unresponsive};
    use runwatch_poller::{CancellationToken, NullReporter, PollPolicy, PollSession};
    use std::time::Duration;

    /// Answers the first fetch from `first`, every later one from `rest`
    struct SplitFetcher {
        first: RunFetcher,
        rest: RunFetcher,
    }

    #[async_trait]
    impl SnapshotFetcher for SplitFetcher {
        type Snapshot = Run;

        async fn fetch(&mut self, ctx: FetchContext) -> anyhow::Result<Run> {
            if ctx.is_first() {
                self.first.fetch(ctx).await
            } else {
                self.rest.fetch(ctx).await
            }
        }
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy::new(Duration::from_millis(10)).with_max_duration(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_watch_run_to_completion() {
        let stub = StubService::default();
        let id = stub.insert_run("deploy", &["Queued", "Running", "Running", "Done"]);
        let client = RunServiceClient::new(stub.clone().serve().await);

        let session =
            PollSession::new(fast_policy(), CancellationToken::new()).with_reporter(NullReporter);
        let mut seen = Vec::new();

        let run = session
            .run(RunFetcher::new(client, id), |run: &Run| {
                seen.push(run.status.to_string())
            })
            .await
            .unwrap();

        assert_eq!(run.status.as_str(), "Done");
        assert_eq!(seen, vec!["Queued", "Running", "Running", "Done"]);
        assert_eq!(stub.get_count(id), 4);
    }

    #[tokio::test]
    async fn test_service_errors_after_first_fetch_are_retried() {
        let stub = StubService::default();
        let id = stub.insert_run("etl", &["Running", "Failed"]);
        let client = RunServiceClient::new(stub.clone().serve().await);
        let fetcher = RunFetcher::new(client.clone(), id);

        // Fail the two checks after the first one; the session should ride them out
        let session =
            PollSession::new(fast_policy(), CancellationToken::new()).with_reporter(NullReporter);
        let stub_for_update = stub.clone();
        let run = session
            .run(fetcher, move |run: &Run| {
                if run.status.as_str() == "Running" {
                    stub_for_update.fail_next_gets(2);
                }
            })
            .await
            .unwrap();

        assert_eq!(run.status.as_str(), "Failed");
        assert_eq!(stub.get_count(id), 4);
    }

    #[tokio::test]
    async fn test_unknown_run_is_a_hard_failure() {
        let stub = StubService::default();
        let client = RunServiceClient::new(stub.serve().await);
        let missing = Uuid::new_v4();

        let session =
            PollSession::new(fast_policy(), CancellationToken::new()).with_reporter(NullReporter);
        let err = session
            .run(RunFetcher::new(client, missing), |_: &Run| {})
            .await
            .unwrap_err();

        assert!(err.is_hard_failure());
        assert!(err.to_string().contains(&missing.to_string()));
    }

    #[tokio::test]
    async fn test_cancel_abandons_hung_request() {
        let stub = StubService::default();
        let id = stub.insert_run("deploy", &["Running"]);
        let fetcher = SplitFetcher {
            first: RunFetcher::new(RunServiceClient::new(stub.serve().await), id),
            rest: RunFetcher::new(RunServiceClient::new(serve_unresponsive().await), id),
        };

        // No time budget, so only cancellation can end the hung request
        let cancel = CancellationToken::new();
        let session = PollSession::new(PollPolicy::new(Duration::from_millis(10)), cancel.clone())
            .with_reporter(NullReporter);

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let err = tokio::time::timeout(
            Duration::from_secs(3),
            session.run(fetcher, |_: &Run| {}),
        )
        .await
        .expect("session should end soon after cancellation")
        .unwrap_err();

        let last = err.into_last_snapshot().expect("interrupt carries a snapshot");
        assert_eq!(last.id, id);
        assert_eq!(last.status.as_str(), "Running");
    }

    #[tokio::test]
    async fn test_cancelled_token_abandons_request_immediately() {
        let client = RunServiceClient::new(serve_unresponsive().await);
        let mut fetcher = RunFetcher::new(client, Uuid::new_v4());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fetcher
            .fetch(FetchContext {
                attempt: 2,
                deadline: None,
                cancel,
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("cancelled"));
    }
}
