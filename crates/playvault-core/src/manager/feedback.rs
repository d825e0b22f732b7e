// Player feedback. Anonymous submissions are allowed; the session token is
// attached when present so the backend can link the report to a player.

use std::sync::Arc;

use playvault_api::{MessageResponse, RequestExecutor};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::CoreError;
use crate::manager::require_text;

/// Longest message the backend stores.
pub const MAX_MESSAGE_LEN: usize = 4000;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FeedbackCategory {
    Bug,
    Suggestion,
    Payment,
    Other,
}

pub struct FeedbackManager {
    executor: Arc<RequestExecutor>,
}

impl FeedbackManager {
    pub const NAME: &'static str = "feedback";

    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    pub async fn submit(
        &self,
        category: FeedbackCategory,
        message: &str,
    ) -> Result<MessageResponse, CoreError> {
        require_text("feedback message", message)?;
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(CoreError::Validation {
                message: format!("feedback message exceeds {MAX_MESSAGE_LEN} characters"),
            });
        }

        Ok(self
            .executor
            .post::<MessageResponse, _>(
                "/feedback",
                &json!({ "category": category, "message": message }),
                true,
            )
            .await
            .into_result()?)
    }
}
