// Request executor
//
// The facade managers talk to. Checks preconditions, runs the retry engine,
// decodes the payload, and publishes the terminal lifecycle event. Every
// public method resolves to a response value; only construction can fail.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::call::{EndpointCall, Method};
use crate::context::SdkContext;
use crate::decode::Payload;
use crate::error::Error;
use crate::events::{RequestFailed, RequestSucceeded, topics};
use crate::policy::RetryPolicy;
use crate::response::{ApiResponse, BinaryResponse};
use crate::retry::{Exchange, Failure, RetryEngine};
use crate::transport::TransportConfig;

/// Builder for [`RequestExecutor`].
///
/// A missing retry policy is not a construction error: the executor is
/// built, and every call fails with `NotInitialized` without touching
/// the network.
#[derive(Debug)]
pub struct ExecutorBuilder {
    context: SdkContext,
    transport: TransportConfig,
    policy: Option<RetryPolicy>,
    http: Option<reqwest::Client>,
}

impl ExecutorBuilder {
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Use a pre-built `reqwest::Client` instead of building one.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<RequestExecutor, Error> {
        let http = match self.http {
            Some(http) => http,
            None => {
                let timeout = self
                    .policy
                    .map_or(self.transport.timeout, |p| p.connection_timeout);
                self.transport.build_client(timeout)?
            }
        };

        Ok(RequestExecutor {
            http,
            context: self.context,
            policy: self.policy,
            api_key: self.transport.api_key,
        })
    }
}

/// Turns logical API calls into resilient HTTP exchanges.
///
/// Cheap to share behind an `Arc`; all per-call state lives on the stack
/// of the call's future, so any number of calls may be in flight.
pub struct RequestExecutor {
    http: reqwest::Client,
    context: SdkContext,
    policy: Option<RetryPolicy>,
    api_key: SecretString,
}

impl RequestExecutor {
    pub fn builder(context: SdkContext, transport: TransportConfig) -> ExecutorBuilder {
        ExecutorBuilder {
            context,
            transport,
            policy: None,
            http: None,
        }
    }

    pub fn context(&self) -> &SdkContext {
        &self.context
    }

    pub fn policy(&self) -> Option<&RetryPolicy> {
        self.policy.as_ref()
    }

    // ── Convenience verbs ────────────────────────────────────────────

    /// `GET {path}`, decoding the body as `T`.
    pub async fn get<T: Payload>(&self, path: &str, use_session: bool) -> ApiResponse<T> {
        self.execute(EndpointCall::get(path).with_session(use_session))
            .await
    }

    /// `POST {path}` with a JSON body, decoding the response as `T`.
    pub async fn post<T, B>(&self, path: &str, body: &B, use_session: bool) -> ApiResponse<T>
    where
        T: Payload,
        B: Serialize + Sync + ?Sized,
    {
        match EndpointCall::post_json(path, body) {
            Ok(call) => self.execute(call.with_session(use_session)).await,
            Err(err) => self.report_failure(
                Method::Post,
                path,
                Uuid::new_v4(),
                &Failure::before_any_attempt(err),
            ),
        }
    }

    /// `POST {path}` with raw bytes, decoding the response as `T`.
    pub async fn post_binary<T: Payload>(
        &self,
        path: &str,
        bytes: impl Into<Bytes>,
        use_session: bool,
    ) -> ApiResponse<T> {
        self.execute(EndpointCall::post_binary(path, bytes).with_session(use_session))
            .await
    }

    /// `GET {path}` returning raw bytes. A 204 answer is `found == false`.
    pub async fn get_binary(&self, path: &str, use_session: bool) -> BinaryResponse {
        self.execute_binary(EndpointCall::get_binary(path).with_session(use_session))
            .await
    }

    // ── Generic execution ────────────────────────────────────────────

    pub async fn execute<T: Payload>(&self, call: EndpointCall) -> ApiResponse<T> {
        self.run_typed(&call, None).await
    }

    /// Like [`execute`](Self::execute), aborting at the next suspension
    /// point once `cancel` fires.
    pub async fn execute_cancellable<T: Payload>(
        &self,
        call: EndpointCall,
        cancel: &CancellationToken,
    ) -> ApiResponse<T> {
        self.run_typed(&call, Some(cancel)).await
    }

    pub async fn execute_binary(&self, call: EndpointCall) -> BinaryResponse {
        self.run_binary(&call, None).await
    }

    pub async fn execute_binary_cancellable(
        &self,
        call: EndpointCall,
        cancel: &CancellationToken,
    ) -> BinaryResponse {
        self.run_binary(&call, Some(cancel)).await
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn run_typed<T: Payload>(
        &self,
        call: &EndpointCall,
        cancel: Option<&CancellationToken>,
    ) -> ApiResponse<T> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let exchange = match self.exchange(call, request_id, cancel).await {
            Ok(exchange) => exchange,
            Err(failure) => {
                return self.report_failure(call.method(), call.path(), request_id, &failure);
            }
        };

        let decoded = std::str::from_utf8(&exchange.payload)
            .map_err(|e| Error::Deserialization {
                message: format!("response body is not valid UTF-8: {e}"),
                body: String::from_utf8_lossy(&exchange.payload).into_owned(),
            })
            .and_then(T::from_body);

        match decoded {
            Ok(data) => {
                self.report_success(call, request_id, &exchange, started);
                ApiResponse::ok(exchange.status, data)
            }
            Err(error) => self.report_failure(
                call.method(),
                call.path(),
                request_id,
                &Failure {
                    error,
                    status: exchange.status,
                    attempts: exchange.attempts,
                },
            ),
        }
    }

    async fn run_binary(
        &self,
        call: &EndpointCall,
        cancel: Option<&CancellationToken>,
    ) -> BinaryResponse {
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        match self.exchange(call, request_id, cancel).await {
            Ok(exchange) => {
                self.report_success(call, request_id, &exchange, started);
                if exchange.status == 204 {
                    debug!(%request_id, path = call.path(), "no content");
                    BinaryResponse::not_found(exchange.status)
                } else {
                    BinaryResponse::found(exchange.status, exchange.payload)
                }
            }
            Err(failure) => {
                let response = BinaryResponse::failed(failure.status, &failure.error);
                self.publish_failure(call.method(), call.path(), request_id, &failure);
                response
            }
        }
    }

    /// Check preconditions, then hand the call to the retry engine.
    async fn exchange(
        &self,
        call: &EndpointCall,
        request_id: Uuid,
        cancel: Option<&CancellationToken>,
    ) -> Result<Exchange, Failure> {
        let Some(policy) = self.policy.as_ref() else {
            return Err(Failure::before_any_attempt(Error::NotInitialized {
                reason: "no retry policy configured".into(),
            }));
        };
        if self.api_key.expose_secret().is_empty() {
            return Err(Failure::before_any_attempt(Error::NotInitialized {
                reason: "no API key configured".into(),
            }));
        }
        if self.context.session().active_host().is_none() {
            return Err(Failure::before_any_attempt(Error::NoActiveHost));
        }

        let engine = RetryEngine {
            http: &self.http,
            session: self.context.session(),
            bus: self.context.bus(),
            policy,
            api_key: &self.api_key,
        };
        engine.run(call, request_id, cancel).await
    }

    fn report_success(
        &self,
        call: &EndpointCall,
        request_id: Uuid,
        exchange: &Exchange,
        started: Instant,
    ) {
        self.context.bus().publish(
            topics::REQUEST_SUCCEEDED,
            &Arc::new(RequestSucceeded {
                request_id,
                method: call.method(),
                path: call.path().to_owned(),
                status: exchange.status,
                attempts: exchange.attempts,
                elapsed: started.elapsed(),
            }),
        );
    }

    fn report_failure<T>(
        &self,
        method: Method,
        path: &str,
        request_id: Uuid,
        failure: &Failure,
    ) -> ApiResponse<T> {
        self.publish_failure(method, path, request_id, failure);
        ApiResponse::failed(failure.status, &failure.error)
    }

    fn publish_failure(&self, method: Method, path: &str, request_id: Uuid, failure: &Failure) {
        warn!(
            %request_id,
            %method,
            path,
            status = failure.status,
            attempts = failure.attempts,
            error = %failure.error,
            "request failed"
        );
        self.context.bus().publish(
            topics::REQUEST_FAILED,
            &Arc::new(RequestFailed {
                request_id,
                method,
                path: path.to_owned(),
                status: failure.status,
                kind: failure.error.kind(),
                message: failure.error.to_string(),
                attempts: failure.attempts,
            }),
        );
    }
}
