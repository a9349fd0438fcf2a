use comparer_core::GameMode;
use thiserror::Error;

/// Default cap on how many of the reference user's top plays are fetched.
pub const DEFAULT_SCORE_LIMIT: usize = 100;

/// Default bound on in-flight API requests during a fan-out phase.
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Environment-derived settings. Credentials are opaque here; they are
/// passed straight through to the API's token endpoint.
#[derive(Clone, Debug)]
pub struct Settings {
    pub client_id: u64,
    pub client_secret: String,
    pub mode: GameMode,
    pub score_limit: usize,
    pub concurrent_requests: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = required("CLIENT_ID")?;
        let client_id = client_id
            .parse()
            .map_err(|_| ConfigError::Invalid("CLIENT_ID", client_id))?;
        let client_secret = required("CLIENT_SECRET")?;

        let mode = match std::env::var("OSU_MODE") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("OSU_MODE", raw))?,
            Err(_) => GameMode::Osu,
        };

        let score_limit = parse_or("SCORE_LIMIT", DEFAULT_SCORE_LIMIT)?;
        let concurrent_requests = parse_or("CONCURRENT_REQUESTS", DEFAULT_CONCURRENT_REQUESTS)?;
        if concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "CONCURRENT_REQUESTS",
                "0".to_string(),
            ));
        }

        Ok(Self {
            client_id,
            client_secret,
            mode,
            score_limit,
            concurrent_requests,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}
