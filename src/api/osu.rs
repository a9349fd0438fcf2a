use chrono::{DateTime, Utc};
use comparer_core::{BeatmapId, Beatmapset, BeatmapsetId, GameMode, Score, UserId};
use log::debug;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::api::{GatewayError, GatewayResult, ScoreGateway};
use crate::config::Settings;

const API_URL: &str = "https://osu.ppy.sh/api/v2";
const TOKEN_URL: &str = "https://osu.ppy.sh/oauth/token";

// Pins the score payload to the current solo-score shape (mod objects,
// ruleset_id) instead of the legacy one.
const API_VERSION: &str = "20240529";

/// Production [`ScoreGateway`] over the osu! v2 REST API with an OAuth2
/// client-credentials token, cached until shortly before expiry.
pub struct OsuGateway {
    http_client: reqwest::Client,
    api_url: String,
    token_url: String,
    client_id: u64,
    client_secret: String,
    mode: GameMode,
    token: Mutex<Option<AccessToken>>,
}

#[derive(Clone, Debug)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: u64,
    client_secret: &'a str,
    grant_type: &'a str,
    scope: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Deserialize)]
struct ApiUser {
    id: UserId,
}

// The per-beatmap score endpoint wraps the score in an envelope.
#[derive(Deserialize)]
struct BeatmapUserScore {
    score: Score,
}

impl OsuGateway {
    pub fn new(settings: &Settings) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url: API_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            client_id: settings.client_id,
            client_secret: settings.client_secret.clone(),
            mode: settings.mode,
            token: Mutex::new(None),
        }
    }

    async fn bearer_token(&self) -> GatewayResult<String> {
        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref() {
            if current.expires_at > Utc::now() {
                return Ok(current.value.clone());
            }
        }

        debug!("Requesting new API access token");
        let resp = self
            .http_client
            .post(&self.token_url)
            .form(&TokenRequest {
                client_id: self.client_id,
                client_secret: &self.client_secret,
                grant_type: "client_credentials",
                scope: "public",
            })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(GatewayError::Auth(format!(
                "token endpoint returned {}",
                resp.status()
            )));
        }
        let parsed: TokenResponse = resp.json().await?;

        let value = parsed.access_token.clone();
        *token = Some(AccessToken {
            value: parsed.access_token,
            // renew a minute early so long fan-out phases never race expiry
            expires_at: Utc::now() + chrono::Duration::seconds(parsed.expires_in - 60),
        });
        Ok(value)
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> GatewayResult<reqwest::Response> {
        let token = self.bearer_token().await?;
        let resp = self
            .http_client
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(token)
            .header("x-api-version", API_VERSION)
            .query(query)
            .send()
            .await?;
        Ok(resp)
    }
}

#[async_trait::async_trait]
impl ScoreGateway for OsuGateway {
    async fn resolve_user(&self, username: &str) -> GatewayResult<UserId> {
        let resp = self
            .get(
                &format!("/users/{}", username),
                &[("key", "username".to_string())],
            )
            .await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(GatewayError::UserNotFound(username.to_string())),
            status if status.is_success() => Ok(resp.json::<ApiUser>().await?.id),
            status => Err(GatewayError::Status(status)),
        }
    }

    async fn top_scores(&self, user: UserId, limit: usize) -> GatewayResult<Vec<Score>> {
        let resp = self
            .get(
                &format!("/users/{}/scores/best", user),
                &[
                    ("mode", self.mode.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }

    async fn user_score_on_map(
        &self,
        user: UserId,
        map: BeatmapId,
    ) -> GatewayResult<Option<Score>> {
        let resp = self
            .get(&format!("/beatmaps/{}/scores/users/{}", map, user), &[])
            .await?;
        match resp.status() {
            StatusCode::NOT_FOUND => {
                debug!("No score for user {} on beatmap {}", user, map);
                Ok(None)
            }
            status if status.is_success() => {
                Ok(Some(resp.json::<BeatmapUserScore>().await?.score))
            }
            status => Err(GatewayError::Status(status)),
        }
    }

    async fn beatmapset(&self, mapset: BeatmapsetId) -> GatewayResult<Beatmapset> {
        let resp = self.get(&format!("/beatmapsets/{}", mapset), &[]).await?;
        if !resp.status().is_success() {
            return Err(GatewayError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }
}
