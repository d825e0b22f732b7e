// ── Runtime SDK configuration ──
//
// Describes *how* to reach the backend. Carries the API key and tuning,
// but never touches disk: the CLI (or a host application) builds an
// `SdkConfig` and hands it to `Sdk::initialize`.

use std::time::Duration;

use playvault_api::RetryPolicy;
use secrecy::SecretString;
use url::Url;

use crate::connection::DEFAULT_HEALTH_PATH;

/// How the active host is chosen at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HostSelection {
    /// Probe every candidate's health endpoint; the first healthy one in
    /// list order wins.
    #[default]
    Probe,
    /// Use the first candidate without probing.
    Fixed,
}

/// Configuration for one SDK instance.
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// Ordered candidate base URLs (e.g. `https://eu.api.playvault.gg/v1`).
    pub hosts: Vec<Url>,
    pub host_selection: HostSelection,
    /// Health endpoint path probed during host selection.
    pub health_path: String,
    /// Game API key sent as `X-API-Key`.
    pub api_key: SecretString,
    /// Restore a previous session instead of signing in.
    pub session_token: Option<SecretString>,
    pub retry: RetryPolicy,
    /// Per-request timeout for health probes.
    pub probe_timeout: Duration,
    /// Lifetime of cached news, leaderboard and remote-config responses.
    /// Zero disables caching.
    pub cache_ttl: Duration,
    /// Overrides the default `User-Agent`.
    pub user_agent: Option<String>,
}

impl SdkConfig {
    pub fn new(hosts: Vec<Url>, api_key: SecretString) -> Self {
        Self {
            hosts,
            host_selection: HostSelection::default(),
            health_path: DEFAULT_HEALTH_PATH.into(),
            api_key,
            session_token: None,
            retry: RetryPolicy::default(),
            probe_timeout: Duration::from_secs(5),
            cache_ttl: Duration::from_secs(60),
            user_agent: None,
        }
    }
}
