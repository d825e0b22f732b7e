// Shared transport configuration for building reqwest::Client instances.
//
// The executor and the connection probe both build their clients here so
// timeout and user-agent settings live in one place.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::Error;

const DEFAULT_USER_AGENT: &str = concat!("playvault-sdk/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Sent as `X-API-Key` on every request.
    pub api_key: SecretString,
    pub user_agent: String,
    /// Used when no retry policy supplies a connection timeout.
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            user_agent: DEFAULT_USER_AGENT.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build a `reqwest::Client` with the given per-request timeout.
    pub fn build_client(&self, timeout: Duration) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| Error::Setup(format!("failed to build HTTP client: {e}")))
    }
}
