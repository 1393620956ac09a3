//! Runwatch HTTP Client
//!
//! A small, type-safe HTTP client for the run service API.
//!
//! Besides plain request methods, the crate provides [`RunFetcher`], which
//! plugs a single run into a [`runwatch_poller::PollSession`].
//!
//! # Example
//!
//! ```no_run
//! use runwatch_client::RunServiceClient;
//! use runwatch_core::dto::run::SubmitRun;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = RunServiceClient::new("http://localhost:8080");
//!
//!     let run = client.submit_run(SubmitRun {
//!         name: "nightly".to_string(),
//!         script: None,
//!         parameters: Default::default(),
//!     }).await?;
//!
//!     println!("Submitted run: {}", run.id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod fetcher;
mod runs;

#[cfg(test)]
mod stub;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use fetcher::RunFetcher;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the run service API
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RunServiceClient {
    /// Base URL of the run service (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl RunServiceClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the run service (e.g., "http://localhost:8080")
    ///
    /// # Example
    /// ```
    /// use runwatch_client::RunServiceClient;
    ///
    /// let client = RunServiceClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use runwatch_client::RunServiceClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .connect_timeout(Duration::from_secs(5))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = RunServiceClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the run service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize a JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status code of a response without a body
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        Self::check_status(response).await.map(|_| ())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}
