// ── SDK bootstrap ──
//
// Wires one context, one executor and every manager together. Startup
// order: build the executor, choose the host, construct managers (each
// announced on `service.initialized`), then announce `sdk.initialized`.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use playvault_api::{RequestExecutor, SdkContext, TransportConfig};
use tracing::info;
use url::Url;

use crate::cache::TtlCache;
use crate::config::{HostSelection, SdkConfig};
use crate::connection::select_host;
use crate::error::CoreError;
use crate::events::{SdkInitialized, ServiceInitialized, topics};
use crate::manager::auth::AuthManager;
use crate::manager::cloud_save::CloudSaveManager;
use crate::manager::feedback::FeedbackManager;
use crate::manager::gift_codes::GiftCodeManager;
use crate::manager::leaderboard::LeaderboardManager;
use crate::manager::news::NewsManager;
use crate::manager::remote_config::RemoteConfigManager;
use crate::manager::remote_log::RemoteLogManager;

/// A fully initialized SDK instance.
///
/// Everything hangs off one [`SdkContext`]; two `Sdk` values never share
/// session state or events unless built over the same context.
pub struct Sdk {
    context: SdkContext,
    executor: Arc<RequestExecutor>,
    auth: AuthManager,
    cloud_save: CloudSaveManager,
    leaderboard: LeaderboardManager,
    remote_config: RemoteConfigManager,
    news: NewsManager,
    gift_codes: GiftCodeManager,
    feedback: FeedbackManager,
    remote_log: RemoteLogManager,
    services: Vec<&'static str>,
    // Held so `sdk.initialized` replays to late subscribers until shutdown.
    initialized: ArcSwapOption<SdkInitialized>,
}

impl Sdk {
    /// Initialize with a fresh context.
    pub async fn initialize(config: SdkConfig) -> Result<Self, CoreError> {
        Self::initialize_with(config, SdkContext::new()).await
    }

    /// Initialize over an existing context, e.g. one whose bus the host
    /// application already subscribed to.
    pub async fn initialize_with(
        config: SdkConfig,
        context: SdkContext,
    ) -> Result<Self, CoreError> {
        let mut transport = TransportConfig::new(config.api_key.clone());
        if let Some(agent) = &config.user_agent {
            transport.user_agent.clone_from(agent);
        }

        let host = match config.host_selection {
            HostSelection::Fixed => {
                let host = config
                    .hosts
                    .first()
                    .cloned()
                    .ok_or(CoreError::NoHostsConfigured)?;
                context.session().set_active_host(host.clone());
                host
            }
            HostSelection::Probe => {
                let probe = transport.build_client(config.probe_timeout)?;
                select_host(&context, &probe, &config.hosts, &config.health_path).await?
            }
        };

        if let Some(token) = config.session_token.clone() {
            context.session().set_session_token(token);
        }

        let executor = Arc::new(
            RequestExecutor::builder(context.clone(), transport)
                .retry_policy(config.retry)
                .build()?,
        );

        let ttl = config.cache_ttl;
        let sdk = Self::assemble(context, executor, host.clone(), ttl);
        info!(host = %host, services = sdk.services.len(), "SDK initialized");
        Ok(sdk)
    }

    fn assemble(
        context: SdkContext,
        executor: Arc<RequestExecutor>,
        host: Url,
        ttl: std::time::Duration,
    ) -> Self {
        let bus = Arc::clone(context.bus());
        let mut services = Vec::new();
        let mut announce = |service: &'static str| {
            bus.publish(
                topics::SERVICE_INITIALIZED,
                &Arc::new(ServiceInitialized { service }),
            );
            services.push(service);
        };

        let auth = AuthManager::new(Arc::clone(&executor));
        announce(AuthManager::NAME);
        let cloud_save = CloudSaveManager::new(Arc::clone(&executor));
        announce(CloudSaveManager::NAME);
        let leaderboard = LeaderboardManager::new(Arc::clone(&executor), TtlCache::new(ttl));
        announce(LeaderboardManager::NAME);
        let remote_config = RemoteConfigManager::new(Arc::clone(&executor), TtlCache::new(ttl));
        announce(RemoteConfigManager::NAME);
        let news = NewsManager::new(Arc::clone(&executor), TtlCache::new(ttl));
        announce(NewsManager::NAME);
        let gift_codes = GiftCodeManager::new(Arc::clone(&executor));
        announce(GiftCodeManager::NAME);
        let feedback = FeedbackManager::new(Arc::clone(&executor));
        announce(FeedbackManager::NAME);
        let remote_log = RemoteLogManager::new(Arc::clone(&executor));
        announce(RemoteLogManager::NAME);

        let initialized = Arc::new(SdkInitialized {
            host,
            services: services.clone(),
        });
        bus.publish(topics::SDK_INITIALIZED, &initialized);

        Self {
            context,
            executor,
            auth,
            cloud_save,
            leaderboard,
            remote_config,
            news,
            gift_codes,
            feedback,
            remote_log,
            services,
            initialized: ArcSwapOption::new(Some(initialized)),
        }
    }

    /// Forget the session and host, drop caches, and announce `sdk.shutdown`.
    ///
    /// Releases the `sdk.initialized` and `auth.signed_in` payloads, so
    /// neither replays to subscribers that attach afterwards. Managers stay
    /// usable as objects, but every call fails with `NoActiveHost` until a
    /// host is set again.
    pub fn shutdown(&self) {
        let session = self.context.session();
        session.clear_session_token();
        session.clear_active_host();
        self.auth.forget_player();
        self.initialized.store(None);
        self.leaderboard.clear_cache();
        self.news.clear_cache();
        self.remote_config.clear_cache();
        self.context.bus().publish_signal(topics::SDK_SHUTDOWN);
        info!("SDK shut down");
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn context(&self) -> &SdkContext {
        &self.context
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    pub fn active_host(&self) -> Option<Arc<Url>> {
        self.context.session().active_host()
    }

    pub fn services(&self) -> &[&'static str] {
        &self.services
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    pub fn cloud_save(&self) -> &CloudSaveManager {
        &self.cloud_save
    }

    pub fn leaderboard(&self) -> &LeaderboardManager {
        &self.leaderboard
    }

    pub fn remote_config(&self) -> &RemoteConfigManager {
        &self.remote_config
    }

    pub fn news(&self) -> &NewsManager {
        &self.news
    }

    pub fn gift_codes(&self) -> &GiftCodeManager {
        &self.gift_codes
    }

    pub fn feedback(&self) -> &FeedbackManager {
        &self.feedback
    }

    pub fn remote_log(&self) -> &RemoteLogManager {
        &self.remote_log
    }
}
