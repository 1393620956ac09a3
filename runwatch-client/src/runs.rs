//! Run-related API endpoints

use std::time::Duration;

use crate::RunServiceClient;
use crate::error::Result;
use runwatch_core::domain::log::LogEntry;
use runwatch_core::domain::run::Run;
use runwatch_core::dto::run::{RunSummary, SubmitRun};
use uuid::Uuid;

impl RunServiceClient {
    // =============================================================================
    // Run Lifecycle
    // =============================================================================

    /// Submit a new run
    ///
    /// # Arguments
    /// * `req` - The run submission request
    ///
    /// # Returns
    /// The created run, normally in `Queued` status
    pub async fn submit_run(&self, req: SubmitRun) -> Result<Run> {
        let url = self.url("/runs");
        let response = self.client.post(&url).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Get a run by ID
    pub async fn get_run(&self, run_id: Uuid) -> Result<Run> {
        self.get_run_with_timeout(run_id, None).await
    }

    /// Get a run by ID, giving up after `timeout` if one is set
    ///
    /// A zero timeout is passed through as-is and fails immediately.
    pub async fn get_run_with_timeout(
        &self,
        run_id: Uuid,
        timeout: Option<Duration>,
    ) -> Result<Run> {
        let url = self.url(&format!("/runs/{}", run_id));
        let mut request = self.client.get(&url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        self.handle_response(response).await
    }

    /// List all runs known to the service
    pub async fn list_runs(&self) -> Result<Vec<RunSummary>> {
        let url = self.url("/runs");
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Ask the service to cancel a run
    ///
    /// Cancellation is asynchronous on the service side; poll the run to see
    /// it reach a cancelled status.
    pub async fn cancel_run(&self, run_id: Uuid) -> Result<()> {
        let url = self.url(&format!("/runs/{}/cancel", run_id));
        let response = self.client.post(&url).send().await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Run Logs
    // =============================================================================

    /// Get captured output for a run
    pub async fn get_run_logs(&self, run_id: Uuid) -> Result<Vec<LogEntry>> {
        let url = self.url(&format!("/runs/{}/logs", run_id));
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
