// Caller-facing response values
//
// Every executor call resolves to one of these, success or not. Failures
// carry a human-readable message plus a `FailureKind` tag; the raw `Error`
// is logged and broadcast, then dropped.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::error::{Error, FailureKind};

/// A failed call, detached from its response so it can travel through `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (HTTP {status}, {kind})")]
pub struct FailedResponse {
    pub status: u16,
    pub kind: FailureKind,
    pub message: String,
}

/// Typed result of a JSON call.
///
/// `data` is populated only when `success` is true and the body decoded
/// into the declared shape. `status` is 0 when no HTTP exchange produced
/// a status (precondition failures, connection errors).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub status: u16,
    pub failure: Option<FailureKind>,
}

impl<T> ApiResponse<T> {
    pub(crate) fn ok(status: u16, data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status,
            failure: None,
        }
    }

    pub(crate) fn failed(status: u16, err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            status,
            failure: Some(err.kind()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Convert into a `Result`, keeping the decoded value or the failure.
    pub fn into_result(self) -> Result<T, FailedResponse> {
        match self.data {
            Some(data) if self.success => Ok(data),
            _ => Err(FailedResponse {
                status: self.status,
                kind: self.failure.unwrap_or(FailureKind::Decode),
                message: self
                    .error
                    .unwrap_or_else(|| "response carried no data".into()),
            }),
        }
    }
}

/// Result of a binary call.
///
/// `found == false` with `success == true` means the backend answered
/// 204 No Content: the resource does not exist, which is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryResponse {
    pub success: bool,
    pub found: bool,
    pub data: Option<Bytes>,
    pub error: Option<String>,
    pub status: u16,
    pub failure: Option<FailureKind>,
}

impl BinaryResponse {
    pub(crate) fn found(status: u16, data: Bytes) -> Self {
        Self {
            success: true,
            found: true,
            data: Some(data),
            error: None,
            status,
            failure: None,
        }
    }

    pub(crate) fn not_found(status: u16) -> Self {
        Self {
            success: true,
            found: false,
            data: None,
            error: None,
            status,
            failure: None,
        }
    }

    pub(crate) fn failed(status: u16, err: &Error) -> Self {
        Self {
            success: false,
            found: false,
            data: None,
            error: Some(err.to_string()),
            status,
            failure: Some(err.kind()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// `Ok(None)` for 204, `Ok(Some(bytes))` for a payload.
    pub fn into_result(self) -> Result<Option<Bytes>, FailedResponse> {
        if self.success {
            return Ok(self.data);
        }
        Err(FailedResponse {
            status: self.status,
            kind: self.failure.unwrap_or(FailureKind::Connection),
            message: self.error.unwrap_or_default(),
        })
    }
}
