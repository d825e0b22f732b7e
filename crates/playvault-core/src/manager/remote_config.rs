// ── Remote config ──
//
// Key/value settings published by the game team. Values arrive as a flat
// object whose members are not reliably typed, so the body is read with
// the string-map scanner instead of serde: quoted values come back
// unescaped, anything else as its raw JSON text.

use std::sync::Arc;

use indexmap::IndexMap;
use playvault_api::{Payload, RequestExecutor, decode_string_map};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::TtlCache;
use crate::error::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub configs: IndexMap<String, String>,
}

impl Payload for RemoteConfig {
    fn from_body(body: &str) -> Result<Self, playvault_api::Error> {
        Ok(Self {
            configs: decode_string_map(body, "configs")?,
        })
    }
}

impl RemoteConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.configs.get(key).map(String::as_str)
    }

    /// Parse the value under `key` as `T`.
    ///
    /// The raw text is tried as JSON first (numbers, booleans, objects),
    /// then as a JSON string, so `T = String` accepts any value.
    pub fn get_parsed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CoreError> {
        let Some(raw) = self.configs.get(key) else {
            return Ok(None);
        };
        serde_json::from_str(raw)
            .or_else(|_| serde_json::from_value(serde_json::Value::String(raw.clone())))
            .map(Some)
            .map_err(|e| CoreError::Validation {
                message: format!("remote config `{key}` = {raw:?} is not the expected type: {e}"),
            })
    }
}

pub struct RemoteConfigManager {
    executor: Arc<RequestExecutor>,
    cache: TtlCache<(), Arc<RemoteConfig>>,
}

impl RemoteConfigManager {
    pub const NAME: &'static str = "remote_config";

    pub fn new(executor: Arc<RequestExecutor>, cache: TtlCache<(), Arc<RemoteConfig>>) -> Self {
        Self { executor, cache }
    }

    /// The full config, from cache when fresh.
    pub async fn fetch(&self) -> Result<Arc<RemoteConfig>, CoreError> {
        if let Some(config) = self.cache.get(&()) {
            debug!("remote config cache hit");
            return Ok(config);
        }
        self.refresh().await
    }

    /// Fetch from the backend, bypassing and then repopulating the cache.
    pub async fn refresh(&self) -> Result<Arc<RemoteConfig>, CoreError> {
        let config = Arc::new(
            self.executor
                .get::<RemoteConfig>("/remote-config", false)
                .await
                .into_result()?,
        );
        debug!(keys = config.configs.len(), "remote config refreshed");
        self.cache.insert((), Arc::clone(&config));
        Ok(config)
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.fetch().await?.get(key).map(str::to_owned))
    }

    pub async fn get_parsed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CoreError> {
        self.fetch().await?.get_parsed(key)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
