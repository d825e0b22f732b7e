//! Async request plumbing for the PlayVault game backend.
//!
//! Everything a service manager needs to talk to the backend lives here:
//!
//! - **[`RequestExecutor`]**: turns an [`EndpointCall`] into a resilient HTTP
//!   exchange. Retries transient failures with a fixed delay, honours
//!   `Retry-After` on 429, attaches the API key and optional bearer token,
//!   and folds every outcome into an [`ApiResponse`] or [`BinaryResponse`].
//!
//! - **[`EventBus`]**: topic-keyed publish/subscribe with weak replay of the
//!   most recent payload to late subscribers. The executor publishes its
//!   request lifecycle on the [`events::topics`].
//!
//! - **[`SessionState`]**: the active host and bearer token, swappable at any
//!   time. Each attempt reads a fresh [`SessionSnapshot`], so a token refreshed
//!   between retries is used by the next attempt.
//!
//! - **Decoding** ([`Payload`]): structured JSON by default, with special
//!   handling for bare arrays, plain-text message envelopes, and flat
//!   string maps ([`decode_string_map`]).

pub mod call;
pub mod context;
pub mod decode;
pub mod error;
pub mod events;
pub mod executor;
pub mod policy;
pub mod response;
mod retry;
pub mod session;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use call::{Body, EndpointCall, Method};
pub use context::SdkContext;
pub use decode::{MessageResponse, Payload, decode_string_map};
pub use error::{Error, FailureKind};
pub use events::{EventBus, Handler, NoData};
pub use executor::{ExecutorBuilder, RequestExecutor};
pub use policy::RetryPolicy;
pub use response::{ApiResponse, BinaryResponse, FailedResponse};
pub use session::{SessionSnapshot, SessionState};
pub use transport::TransportConfig;

pub use tokio_util::sync::CancellationToken;
