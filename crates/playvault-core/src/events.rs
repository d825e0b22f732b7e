// SDK lifecycle events published on the shared bus, next to the request
// events from `playvault_api::events`.

use std::time::Duration;

use url::Url;

/// Topic names published by this crate.
pub mod topics {
    pub const CONNECTION_SELECTED: &str = "connection.selected";
    pub const CONNECTION_FAILED: &str = "connection.failed";
    pub const SERVICE_INITIALIZED: &str = "service.initialized";
    pub const SDK_INITIALIZED: &str = "sdk.initialized";
    /// Signal topic, payload [`NoData`](playvault_api::NoData).
    pub const SDK_SHUTDOWN: &str = "sdk.shutdown";
    pub const AUTH_SIGNED_IN: &str = "auth.signed_in";
    /// Signal topic, payload [`NoData`](playvault_api::NoData).
    pub const AUTH_SIGNED_OUT: &str = "auth.signed_out";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSelected {
    pub host: Url,
    /// Time spent probing before this host answered.
    pub elapsed: Duration,
}

/// Every candidate failed its health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionFailed {
    /// `(host, reason)` per candidate, in probe order.
    pub attempts: Vec<(Url, String)>,
}

/// A manager finished construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInitialized {
    pub service: &'static str,
}

/// The SDK is ready. Replayed to late subscribers while the `Sdk` is alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkInitialized {
    pub host: Url,
    pub services: Vec<&'static str>,
}

/// A player signed in. Replayed to late subscribers until sign-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub player_id: String,
    pub display_name: Option<String>,
    pub guest: bool,
}
