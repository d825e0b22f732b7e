use std::sync::Arc;

use playvault_api::{MessageResponse, RequestExecutor};
use serde_json::json;
use tracing::info;

use crate::error::CoreError;
use crate::manager::{require_session, require_text};

pub struct GiftCodeManager {
    executor: Arc<RequestExecutor>,
}

impl GiftCodeManager {
    pub const NAME: &'static str = "gift_codes";

    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Redeem `code` for the signed-in player.
    ///
    /// A code the backend refuses (expired, already used) is usually still
    /// a 2xx with `success: false`; inspect the returned message.
    pub async fn redeem(&self, code: &str) -> Result<MessageResponse, CoreError> {
        let code = code.trim();
        require_text("gift code", code)?;
        require_session(&self.executor)?;

        let resp = self
            .executor
            .post::<MessageResponse, _>("/gift-codes/redeem", &json!({ "code": code }), true)
            .await
            .into_result()?;
        info!(success = resp.success, "gift code redeemed");
        Ok(resp)
    }
}
