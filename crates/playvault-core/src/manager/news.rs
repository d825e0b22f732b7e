// News feed, cached for the configured TTL.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use playvault_api::RequestExecutor;
use serde::{Deserialize, Serialize};

use crate::cache::TtlCache;
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
}

pub struct NewsManager {
    executor: Arc<RequestExecutor>,
    cache: TtlCache<(), Arc<Vec<NewsItem>>>,
}

impl NewsManager {
    pub const NAME: &'static str = "news";

    pub fn new(executor: Arc<RequestExecutor>, cache: TtlCache<(), Arc<Vec<NewsItem>>>) -> Self {
        Self { executor, cache }
    }

    /// Latest published items, newest first as served by the backend.
    pub async fn latest(&self) -> Result<Arc<Vec<NewsItem>>, CoreError> {
        if let Some(items) = self.cache.get(&()) {
            return Ok(items);
        }
        let items = Arc::new(
            self.executor
                .get::<Vec<NewsItem>>("/news", false)
                .await
                .into_result()?,
        );
        self.cache.insert((), Arc::clone(&items));
        Ok(items)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
