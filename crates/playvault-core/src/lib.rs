//! Service layer between `playvault-api` and game clients (or the CLI).
//!
//! - **[`Sdk`]**: bootstrap facade. [`Sdk::initialize`] picks a reachable
//!   host, builds the shared [`RequestExecutor`](playvault_api::RequestExecutor),
//!   constructs every manager and announces each on the event bus.
//!
//! - **Managers** ([`manager`]): one per feature area (auth, cloud saves,
//!   leaderboards, remote config, news, gift codes, feedback, remote log).
//!   They validate input, enforce sign-in where the backend requires it,
//!   and translate failed responses into [`CoreError`].
//!
//! - **[`TtlCache`]**: the `DashMap`-backed expiring cache the read-heavy
//!   managers share.

pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod manager;
pub mod sdk;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::TtlCache;
pub use config::{HostSelection, SdkConfig};
pub use connection::select_host;
pub use error::CoreError;
pub use sdk::Sdk;

pub use manager::auth::{AuthManager, Player};
pub use manager::cloud_save::{CloudSaveManager, SaveSlot};
pub use manager::feedback::{FeedbackCategory, FeedbackManager};
pub use manager::gift_codes::GiftCodeManager;
pub use manager::leaderboard::{LeaderboardEntry, LeaderboardManager, PlayerRank, ScoreSubmission};
pub use manager::news::{NewsItem, NewsManager};
pub use manager::remote_config::{RemoteConfig, RemoteConfigManager};
pub use manager::remote_log::{LogLevel, RemoteLogManager};

// The API crate's caller-facing types, so consumers need only this crate.
pub use playvault_api::{
    EventBus, FailureKind, Handler, MessageResponse, NoData, RetryPolicy, SdkContext,
};
