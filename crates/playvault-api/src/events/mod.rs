// Event bus and the request lifecycle events the executor emits.

mod bus;

use std::time::Duration;

use uuid::Uuid;

use crate::call::Method;
use crate::error::FailureKind;

pub use bus::{EventBus, Handler, NoData};

/// Topic names published by the request executor.
pub mod topics {
    pub const REQUEST_STARTED: &str = "request.started";
    pub const REQUEST_SUCCEEDED: &str = "request.succeeded";
    pub const REQUEST_FAILED: &str = "request.failed";
    pub const RATE_LIMITED: &str = "request.rate_limited";
    pub const RETRY_ATTEMPTED: &str = "request.retry_attempted";
}

/// One attempt is about to hit the wire. Published once per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestStarted {
    pub request_id: Uuid,
    pub method: Method,
    pub path: String,
    pub attempt: u32,
}

/// A call finished successfully (after decoding, for typed calls).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSucceeded {
    pub request_id: Uuid,
    pub method: Method,
    pub path: String,
    pub status: u16,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// A call reached a terminal failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailed {
    pub request_id: Uuid,
    pub method: Method,
    pub path: String,
    pub status: u16,
    pub kind: FailureKind,
    pub message: String,
    pub attempts: u32,
}

/// The backend answered 429; the call sleeps `retry_after` before retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimited {
    pub request_id: Uuid,
    pub path: String,
    pub attempt: u32,
    pub retry_after: Duration,
}

/// A transient failure; the call sleeps `delay` before its next attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAttempted {
    pub request_id: Uuid,
    pub path: String,
    /// The attempt that just failed.
    pub attempt: u32,
    pub delay: Duration,
    pub reason: String,
}
