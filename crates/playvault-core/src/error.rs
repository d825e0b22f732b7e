// ── Core error types ──
//
// What managers and the SDK bootstrap report. Callers of this crate see
// domain failures ("not signed in", "no reachable host"); the transport
// detail from `playvault_api` is folded into `Api` with its failure kind.

use playvault_api::{FailedResponse, FailureKind};
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("No reachable host among {} candidate(s): {}", candidates.len(), candidates.join(", "))]
    NoReachableHost { candidates: Vec<String> },

    #[error("No candidate hosts configured")]
    NoHostsConfigured,

    // ── Session errors ───────────────────────────────────────────────
    #[error("Not signed in -- call a login method first")]
    NotSignedIn,

    #[error("Authentication rejected: {message}")]
    Unauthorized { message: String },

    // ── Request errors ───────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        kind: FailureKind,
        /// HTTP status, or 0 when no response was received.
        status: u16,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// HTTP status behind this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } if *status != 0 => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` when retrying later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NoReachableHost { .. } => true,
            Self::Api { kind, .. } => matches!(
                kind,
                FailureKind::Connection
                    | FailureKind::Server
                    | FailureKind::RateLimited
                    | FailureKind::RetriesExhausted
            ),
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<FailedResponse> for CoreError {
    fn from(resp: FailedResponse) -> Self {
        match (resp.kind, resp.status) {
            (FailureKind::Client, 401 | 403) => CoreError::Unauthorized {
                message: resp.message,
            },
            (FailureKind::Config, _) => CoreError::Config {
                message: resp.message,
            },
            (kind, status) => CoreError::Api {
                message: resp.message,
                kind,
                status,
            },
        }
    }
}

impl From<playvault_api::Error> for CoreError {
    fn from(err: playvault_api::Error) -> Self {
        match err {
            playvault_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            playvault_api::Error::Setup(message) => CoreError::Config { message },
            other => CoreError::Api {
                message: other.to_string(),
                kind: other.kind(),
                status: other.status().unwrap_or(0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_status_maps_to_domain_error() {
        let err = CoreError::from(FailedResponse {
            status: 401,
            kind: FailureKind::Client,
            message: "bad token".into(),
        });
        assert!(matches!(err, CoreError::Unauthorized { ref message } if message == "bad token"));
        assert!(!err.is_transient());
    }

    #[test]
    fn exhausted_retries_are_transient() {
        let err = CoreError::from(FailedResponse {
            status: 503,
            kind: FailureKind::RetriesExhausted,
            message: "busy".into(),
        });
        assert_eq!(err.status(), Some(503));
        assert!(err.is_transient());
    }

    #[test]
    fn setup_error_becomes_config() {
        let err = CoreError::from(playvault_api::Error::Setup("no TLS backend".into()));
        assert!(matches!(err, CoreError::Config { .. }));
    }
}
