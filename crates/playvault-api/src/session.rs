// Host and session state
//
// The active base URL and the bearer token, shared by every in-flight
// request. Reads are lock-free pointer loads; writes swap the whole value,
// so a request never observes a half-written host or token.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::SecretString;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Active host plus optional bearer credential.
#[derive(Debug, Default)]
pub struct SessionState {
    host: ArcSwapOption<Url>,
    token: ArcSwapOption<SecretString>,
}

/// A consistent view of the session taken at the start of an attempt.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub host: Arc<Url>,
    pub token: Option<Arc<SecretString>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Host ─────────────────────────────────────────────────────────

    /// Replace the base URL used as prefix for every subsequent call.
    pub fn set_active_host(&self, url: Url) {
        debug!(host = %url, "active host changed");
        self.host.store(Some(Arc::new(url)));
    }

    /// Parse and install a base URL.
    pub fn set_active_host_str(&self, raw: &str) -> Result<(), Error> {
        self.set_active_host(Url::parse(raw)?);
        Ok(())
    }

    pub fn clear_active_host(&self) {
        debug!("active host cleared");
        self.host.store(None);
    }

    pub fn active_host(&self) -> Option<Arc<Url>> {
        self.host.load_full()
    }

    // ── Token ────────────────────────────────────────────────────────

    pub fn set_session_token(&self, token: SecretString) {
        debug!("session token updated");
        self.token.store(Some(Arc::new(token)));
    }

    pub fn clear_session_token(&self) {
        debug!("session token cleared");
        self.token.store(None);
    }

    pub fn has_session_token(&self) -> bool {
        self.token.load().is_some()
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    /// Host and token as one value, or `None` while no host is set.
    ///
    /// The token is only reachable through a snapshot, which requires a
    /// host: callers cannot observe a credential without a destination.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        let host = self.host.load_full()?;
        Some(SessionSnapshot {
            host,
            token: self.token.load_full(),
        })
    }
}

impl SessionSnapshot {
    /// Join an endpoint path onto the active host.
    ///
    /// Trailing slashes on the host and leading slashes on the path are
    /// collapsed, so `https://api/v1/` + `/news` yields `https://api/v1/news`.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.host.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}
