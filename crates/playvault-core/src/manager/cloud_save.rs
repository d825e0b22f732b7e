// ── Cloud saves ──
//
// Opaque per-slot blobs owned by the signed-in player. Uploads and
// downloads go through the executor's binary paths; a missing slot comes
// back as 204 and is reported as `None`, not as an error.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use playvault_api::{MessageResponse, RequestExecutor};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::CoreError;
use crate::manager::{require_session, validate_segment};

/// Metadata for one stored slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSlot {
    pub slot: String,
    #[serde(default)]
    pub size_bytes: u64,
    pub updated_at: DateTime<Utc>,
}

pub struct CloudSaveManager {
    executor: Arc<RequestExecutor>,
}

impl CloudSaveManager {
    pub const NAME: &'static str = "cloud_save";

    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn list_slots(&self) -> Result<Vec<SaveSlot>, CoreError> {
        require_session(&self.executor)?;
        Ok(self
            .executor
            .get::<Vec<SaveSlot>>("/saves", true)
            .await
            .into_result()?)
    }

    /// Overwrite `slot` with `data`.
    pub async fn save(&self, slot: &str, data: impl Into<Bytes>) -> Result<(), CoreError> {
        validate_segment("slot", slot)?;
        require_session(&self.executor)?;
        let data = data.into();
        debug!(slot, size = data.len(), "uploading save");
        self.executor
            .post_binary::<serde_json::Value>(&format!("/saves/{slot}"), data, true)
            .await
            .into_result()?;
        Ok(())
    }

    /// Contents of `slot`, or `None` if nothing was ever saved there.
    pub async fn load(&self, slot: &str) -> Result<Option<Bytes>, CoreError> {
        validate_segment("slot", slot)?;
        require_session(&self.executor)?;
        Ok(self
            .executor
            .get_binary(&format!("/saves/{slot}"), true)
            .await
            .into_result()?)
    }

    pub async fn delete(&self, slot: &str) -> Result<MessageResponse, CoreError> {
        validate_segment("slot", slot)?;
        require_session(&self.executor)?;
        Ok(self
            .executor
            .post::<MessageResponse, _>(&format!("/saves/{slot}/delete"), &json!({}), true)
            .await
            .into_result()?)
    }
}
