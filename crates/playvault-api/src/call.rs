// Endpoint call description
//
// One logical request: path, verb, payload and whether the session token
// should be attached. Built once and never mutated after dispatch.

use bytes::Bytes;
use serde::Serialize;

use crate::error::Error;

/// HTTP verbs the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Binary(Bytes),
}

/// A logical API call handed to the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointCall {
    path: String,
    method: Method,
    body: Body,
    requires_session: bool,
    expects_binary: bool,
}

impl EndpointCall {
    // ── Constructors ─────────────────────────────────────────────────

    /// `GET {path}` expecting a JSON body.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(path, Method::Get, Body::Empty, false)
    }

    /// `GET {path}` expecting raw bytes (`Accept: application/octet-stream`).
    pub fn get_binary(path: impl Into<String>) -> Self {
        Self::new(path, Method::Get, Body::Empty, true)
    }

    /// `POST {path}` with a JSON-serialized body.
    pub fn post_json<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(Error::Serialization)?;
        Ok(Self::new(path, Method::Post, Body::Json(value), false))
    }

    /// `POST {path}` with an opaque byte payload.
    pub fn post_binary(path: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::new(path, Method::Post, Body::Binary(bytes.into()), false)
    }

    fn new(path: impl Into<String>, method: Method, body: Body, expects_binary: bool) -> Self {
        Self {
            path: path.into(),
            method,
            body,
            requires_session: false,
            expects_binary,
        }
    }

    /// Attach the bearer token (when one is set) to every attempt.
    pub fn with_session(mut self, requires_session: bool) -> Self {
        self.requires_session = requires_session;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn requires_session(&self) -> bool {
        self.requires_session
    }

    pub fn expects_binary(&self) -> bool {
        self.expects_binary
    }
}
