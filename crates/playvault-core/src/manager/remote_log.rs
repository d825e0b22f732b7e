// ── Remote logging ──
//
// Ships client-side diagnostics to the backend. Best-effort by nature, but
// failures are still returned so the caller decides whether to care.

use std::sync::Arc;

use chrono::Utc;
use playvault_api::RequestExecutor;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::CoreError;
use crate::manager::require_text;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

pub struct RemoteLogManager {
    executor: Arc<RequestExecutor>,
}

impl RemoteLogManager {
    pub const NAME: &'static str = "remote_log";

    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn send(&self, level: LogLevel, message: &str) -> Result<(), CoreError> {
        require_text("log message", message)?;
        let entry = json!({
            "level": level,
            "message": message,
            "timestamp": Utc::now(),
        });
        self.executor
            .post::<serde_json::Value, _>("/logs", &entry, true)
            .await
            .into_result()?;
        Ok(())
    }
}
