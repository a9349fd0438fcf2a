mod osu;

pub use osu::OsuGateway;

use std::sync::Arc;

use comparer_core::{BeatmapId, Beatmapset, BeatmapsetId, Score, UserId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response status: {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// The remote score API as this tool consumes it. A score lookup that
/// finds nothing is `Ok(None)`, not an error; only user resolution has a
/// dedicated not-found failure.
#[async_trait::async_trait]
pub trait ScoreGateway {
    async fn resolve_user(&self, username: &str) -> GatewayResult<UserId>;

    async fn top_scores(&self, user: UserId, limit: usize) -> GatewayResult<Vec<Score>>;

    async fn user_score_on_map(
        &self,
        user: UserId,
        map: BeatmapId,
    ) -> GatewayResult<Option<Score>>;

    async fn beatmapset(&self, mapset: BeatmapsetId) -> GatewayResult<Beatmapset>;
}

pub type ArcScoreGateway = Arc<Box<dyn ScoreGateway + Send + Sync + 'static>>;
