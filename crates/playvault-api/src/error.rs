use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `playvault-api` crate.
///
/// Covers every failure mode of a single logical call: preconditions,
/// transport, HTTP status classification, decoding, and cancellation.
/// The executor never hands these to callers directly for ordinary
/// network conditions -- they are folded into
/// [`ApiResponse`](crate::ApiResponse) / [`BinaryResponse`](crate::BinaryResponse)
/// values. Only construction (malformed configuration) returns `Err`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Preconditions ───────────────────────────────────────────────
    /// No base URL has been selected yet.
    #[error("No active host -- select a connection before issuing requests")]
    NoActiveHost,

    /// The executor is missing its retry policy or API key.
    #[error("Request executor not initialized: {reason}")]
    NotInitialized { reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// DNS failure, refused connection, timeout, or a body cut short.
    #[error("Connection failed: {0}")]
    Connection(#[source] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Setup(String),

    // ── HTTP status ─────────────────────────────────────────────────
    /// 5xx from the backend.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// 429 from the backend, with the delay it asked for.
    #[error("Rate limited -- retry after {}ms", retry_after.as_millis())]
    RateLimited { retry_after: Duration },

    /// Any other non-success status. Never retried.
    #[error("Request rejected (HTTP {status}): {message}")]
    Client {
        status: u16,
        message: String,
        code: Option<String>,
    },

    /// The attempt budget ran out; `last` is the final attempt's error.
    #[error("Retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<Error> },

    // ── Data ────────────────────────────────────────────────────────
    /// Request body could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Response body did not match the declared shape, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Control ─────────────────────────────────────────────────────
    /// The caller's cancellation token fired at a suspension point.
    #[error("Request cancelled")]
    Cancelled,
}

/// Copyable classification tag for an [`Error`].
///
/// Carried on failed responses and events so observers can branch on
/// the failure class without holding the (non-`Clone`) error itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, serde::Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NoActiveHost,
    NotInitialized,
    Connection,
    Server,
    RateLimited,
    Client,
    Encode,
    Decode,
    RetriesExhausted,
    Cancelled,
    Config,
}

impl Error {
    /// The classification tag for this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoActiveHost => FailureKind::NoActiveHost,
            Self::NotInitialized { .. } => FailureKind::NotInitialized,
            Self::Connection(_) => FailureKind::Connection,
            Self::InvalidUrl(_) | Self::Setup(_) => FailureKind::Config,
            Self::Server { .. } => FailureKind::Server,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::Client { .. } => FailureKind::Client,
            Self::RetriesExhausted { .. } => FailureKind::RetriesExhausted,
            Self::Serialization(_) => FailureKind::Encode,
            Self::Deserialization { .. } => FailureKind::Decode,
            Self::Cancelled => FailureKind::Cancelled,
        }
    }

    /// Returns `true` if another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Server { .. } | Self::RateLimited { .. }
        )
    }

    /// HTTP status associated with this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::Connection(e) => e.status().map(|s| s.as_u16()),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Backend error code from the `{message, code}` body, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Client { code, .. } => code.as_deref(),
            Self::RetriesExhausted { last, .. } => last.api_error_code(),
            _ => None,
        }
    }
}
