// ── Leaderboards ──
//
// Top-N listings are cached per (board, limit). Submitting a score drops
// every cached listing of that board, whatever its limit.

use std::sync::Arc;

use playvault_api::{Payload, RequestExecutor};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::cache::TtlCache;
use crate::error::CoreError;
use crate::manager::{require_session, validate_segment};

/// Upper bound the backend accepts for `limit`.
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub player_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    #[serde(default)]
    pub accepted: bool,
    /// Rank after the submission, if the backend computed one.
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub best_score: Option<i64>,
}

impl Payload for ScoreSubmission {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRank {
    pub rank: u32,
    pub score: i64,
    #[serde(default)]
    pub total_players: Option<u64>,
}

impl Payload for PlayerRank {}

pub struct LeaderboardManager {
    executor: Arc<RequestExecutor>,
    cache: TtlCache<(String, u32), Arc<Vec<LeaderboardEntry>>>,
}

impl LeaderboardManager {
    pub const NAME: &'static str = "leaderboard";

    pub fn new(
        executor: Arc<RequestExecutor>,
        cache: TtlCache<(String, u32), Arc<Vec<LeaderboardEntry>>>,
    ) -> Self {
        Self { executor, cache }
    }

    /// The best `limit` entries of `board`.
    pub async fn top(
        &self,
        board: &str,
        limit: u32,
    ) -> Result<Arc<Vec<LeaderboardEntry>>, CoreError> {
        validate_segment("board", board)?;
        if limit == 0 || limit > MAX_LIMIT {
            return Err(CoreError::Validation {
                message: format!("limit must be between 1 and {MAX_LIMIT}, got {limit}"),
            });
        }

        let key = (board.to_owned(), limit);
        if let Some(entries) = self.cache.get(&key) {
            debug!(board, limit, "leaderboard cache hit");
            return Ok(entries);
        }

        let path = format!("/leaderboards/{board}/top?limit={limit}");
        let entries = Arc::new(
            self.executor
                .get::<Vec<LeaderboardEntry>>(&path, false)
                .await
                .into_result()?,
        );
        self.cache.insert(key, Arc::clone(&entries));
        Ok(entries)
    }

    pub async fn submit(&self, board: &str, score: i64) -> Result<ScoreSubmission, CoreError> {
        validate_segment("board", board)?;
        require_session(&self.executor)?;

        let result = self
            .executor
            .post::<ScoreSubmission, _>(
                &format!("/leaderboards/{board}/scores"),
                &json!({ "score": score }),
                true,
            )
            .await
            .into_result()?;

        self.cache.invalidate_where(|(cached, _)| cached == board);
        Ok(result)
    }

    /// The signed-in player's standing on `board`.
    pub async fn rank(&self, board: &str) -> Result<PlayerRank, CoreError> {
        validate_segment("board", board)?;
        require_session(&self.executor)?;
        Ok(self
            .executor
            .get::<PlayerRank>(&format!("/leaderboards/{board}/rank"), true)
            .await
            .into_result()?)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
