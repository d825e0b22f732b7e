// Retry/backoff engine
//
// Drives the attempt loop for one logical call:
//
//   Attempting ─► Success
//       │  ├────► RateLimitedWait ─► Attempting
//       │  └────► RetryWait ───────► Attempting
//       └───────► Failed
//
// The attempt counter is bumped at the top of every iteration, so a 429
// wait consumes budget exactly like a transport retry. Session state is
// re-read per attempt so a token refreshed mid-loop is picked up.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::call::{Body, EndpointCall};
use crate::error::Error;
use crate::events::{EventBus, RateLimited, RequestStarted, RetryAttempted, topics};
use crate::policy::RetryPolicy;
use crate::session::{SessionSnapshot, SessionState};

const JSON: &str = "application/json";
const OCTET_STREAM: &str = "application/octet-stream";

// ── Error response shape from the backend ────────────────────────────

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Per-attempt outcome ──────────────────────────────────────────────

/// What one transport exchange amounted to.
#[derive(Debug)]
pub(crate) enum Outcome {
    Success { status: u16, payload: Bytes },
    RateLimited { retry_after: Option<Duration> },
    RetryableFailure { status: u16, error: Error },
    TerminalFailure { status: u16, error: Error },
}

/// A completed exchange handed to the decoder.
#[derive(Debug)]
pub(crate) struct Exchange {
    pub status: u16,
    pub payload: Bytes,
    pub attempts: u32,
}

/// A terminal failure with the context the facade reports.
#[derive(Debug)]
pub(crate) struct Failure {
    pub error: Error,
    pub status: u16,
    pub attempts: u32,
}

impl Failure {
    pub(crate) fn before_any_attempt(error: Error) -> Self {
        Self {
            error,
            status: 0,
            attempts: 0,
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────────

pub(crate) struct RetryEngine<'a> {
    pub http: &'a reqwest::Client,
    pub session: &'a SessionState,
    pub bus: &'a EventBus,
    pub policy: &'a RetryPolicy,
    pub api_key: &'a SecretString,
}

impl RetryEngine<'_> {
    /// Run the attempt loop until success, a terminal failure, or budget exhaustion.
    pub(crate) async fn run(
        &self,
        call: &EndpointCall,
        request_id: Uuid,
        cancel: Option<&CancellationToken>,
    ) -> Result<Exchange, Failure> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let fail = |error: Error, status: u16| Failure {
                error,
                status,
                attempts: attempt,
            };

            let Some(snapshot) = self.session.snapshot() else {
                return Err(fail(Error::NoActiveHost, 0));
            };
            let request = self
                .build_request(call, &snapshot)
                .map_err(|e| fail(e, 0))?;

            self.bus.publish(
                topics::REQUEST_STARTED,
                &Arc::new(RequestStarted {
                    request_id,
                    method: call.method(),
                    path: call.path().to_owned(),
                    attempt,
                }),
            );
            debug!(%request_id, method = %call.method(), path = call.path(), attempt, "sending request");

            let sent = until_cancelled(cancel, request.send())
                .await
                .map_err(|e| fail(e, 0))?;
            let outcome = until_cancelled(cancel, classify(sent))
                .await
                .map_err(|e| fail(e, 0))?;

            let (status, error, delay) = match outcome {
                Outcome::Success { status, payload } => {
                    debug!(%request_id, status, attempt, "request succeeded");
                    return Ok(Exchange {
                        status,
                        payload,
                        attempts: attempt,
                    });
                }
                Outcome::TerminalFailure { status, error } => return Err(fail(error, status)),
                Outcome::RateLimited { retry_after } => {
                    let delay = retry_after.unwrap_or(self.policy.fixed_delay);
                    (429, Error::RateLimited { retry_after: delay }, delay)
                }
                Outcome::RetryableFailure { status, error } => {
                    (status, error, self.policy.fixed_delay)
                }
            };

            if attempt >= max_attempts {
                warn!(%request_id, path = call.path(), attempts = attempt, error = %error, "retry budget exhausted");
                return Err(fail(
                    Error::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(error),
                    },
                    status,
                ));
            }

            if status == 429 {
                warn!(%request_id, path = call.path(), attempt, delay_ms = delay.as_millis(), "rate limited, backing off");
                self.bus.publish(
                    topics::RATE_LIMITED,
                    &Arc::new(RateLimited {
                        request_id,
                        path: call.path().to_owned(),
                        attempt,
                        retry_after: delay,
                    }),
                );
            } else {
                warn!(%request_id, path = call.path(), attempt, error = %error, "transient failure, retrying");
                self.bus.publish(
                    topics::RETRY_ATTEMPTED,
                    &Arc::new(RetryAttempted {
                        request_id,
                        path: call.path().to_owned(),
                        attempt,
                        delay,
                        reason: error.to_string(),
                    }),
                );
            }

            until_cancelled(cancel, tokio::time::sleep(delay))
                .await
                .map_err(|e| fail(e, status))?;
        }
    }

    /// Assemble one attempt's request from the call and the current session.
    fn build_request(
        &self,
        call: &EndpointCall,
        snapshot: &SessionSnapshot,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let url = snapshot.endpoint_url(call.path())?;
        let mut headers = HeaderMap::new();

        let mut key = HeaderValue::from_str(self.api_key.expose_secret())
            .map_err(|e| Error::Setup(format!("invalid API key header value: {e}")))?;
        key.set_sensitive(true);
        headers.insert("X-API-Key", key);

        if call.requires_session() {
            if let Some(token) = &snapshot.token {
                let mut bearer =
                    HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                        .map_err(|e| Error::Setup(format!("invalid session token: {e}")))?;
                bearer.set_sensitive(true);
                headers.insert(AUTHORIZATION, bearer);
            }
        }

        if call.expects_binary() {
            headers.insert(ACCEPT, HeaderValue::from_static(OCTET_STREAM));
        }

        let builder = self.http.request(call.method().into(), url);
        let builder = match call.body() {
            Body::Empty => builder,
            Body::Json(value) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
                builder.body(serde_json::to_vec(value).map_err(Error::Serialization)?)
            }
            Body::Binary(bytes) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM));
                builder.body(bytes.clone())
            }
        };

        Ok(builder.headers(headers))
    }
}

// ── Classification ───────────────────────────────────────────────────

/// Map a transport result onto an [`Outcome`], reading the body where needed.
pub(crate) async fn classify(result: Result<reqwest::Response, reqwest::Error>) -> Outcome {
    let resp = match result {
        Ok(resp) => resp,
        Err(e) => {
            return Outcome::RetryableFailure {
                status: e.status().map_or(0, |s| s.as_u16()),
                error: Error::Connection(e),
            };
        }
    };

    let status = resp.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Outcome::RateLimited {
            retry_after: parse_retry_after(resp.headers()),
        };
    }

    let code = status.as_u16();
    match resp.bytes().await {
        Err(e) => Outcome::RetryableFailure {
            status: code,
            error: Error::Connection(e),
        },
        Ok(payload) if status.is_success() => Outcome::Success {
            status: code,
            payload,
        },
        Ok(payload) if status.is_server_error() => {
            let (message, _) = error_message(status, &payload);
            Outcome::RetryableFailure {
                status: code,
                error: Error::Server {
                    status: code,
                    message,
                },
            }
        }
        Ok(payload) => {
            let (message, api_code) = error_message(status, &payload);
            Outcome::TerminalFailure {
                status: code,
                error: Error::Client {
                    status: code,
                    message,
                    code: api_code,
                },
            }
        }
    }
}

/// Message from a `{message, code}` body, else the raw text, else `HTTP {status}`.
fn error_message(status: StatusCode, payload: &[u8]) -> (String, Option<String>) {
    let raw = String::from_utf8_lossy(payload);
    let fallback = || format!("HTTP {}", status.as_u16());

    if let Ok(err) = serde_json::from_slice::<ErrorResponse>(payload) {
        let message = err
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(fallback);
        return (message, err.code);
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        (fallback(), None)
    } else {
        let preview: String = trimmed.chars().take(200).collect();
        (preview, None)
    }
}

/// `Retry-After` as delta-seconds (fractional allowed) or an HTTP-date.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(secs) = raw.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).ok();
    }

    let when = DateTime::parse_from_rfc2822(raw).ok()?;
    let delta = when.with_timezone(&Utc) - Utc::now();
    Some(delta.to_std().unwrap_or(Duration::ZERO))
}

/// Await `fut`, bailing out with `Error::Cancelled` if the token fires first.
async fn until_cancelled<F: Future>(
    cancel: Option<&CancellationToken>,
    fut: F,
) -> Result<F::Output, Error> {
    match cancel {
        Some(token) => tokio::select! {
            () = token.cancelled() => Err(Error::Cancelled),
            out = fut => Ok(out),
        },
        None => Ok(fut.await),
    }
}
