//! Configuration module
//!
//! Settings shared by every command, populated from flags and environment.

use runwatch_client::RunServiceClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the run service
    pub server_url: String,

    /// Surface retried status checks and verbose logs
    pub debug: bool,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server_url.is_empty() {
            anyhow::bail!("server URL cannot be empty");
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            anyhow::bail!("server URL must start with http:// or https://");
        }

        Ok(())
    }

    /// Client for the configured run service
    pub fn client(&self) -> RunServiceClient {
        RunServiceClient::new(self.server_url.as_str())
    }
}
