use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{BeatmapId, BeatmapsetId, UserId};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "u8")]
pub enum GameMode {
    Osu,
    Taiko,
    Fruits,
    Mania,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Osu => "osu",
            GameMode::Taiko => "taiko",
            GameMode::Fruits => "fruits",
            GameMode::Mania => "mania",
        }
    }
}

impl From<u8> for GameMode {
    fn from(ruleset_id: u8) -> Self {
        match ruleset_id {
            1 => GameMode::Taiko,
            2 => GameMode::Fruits,
            3 => GameMode::Mania,
            // unknown ruleset ids fall back to standard
            _ => GameMode::Osu,
        }
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "osu" => Ok(GameMode::Osu),
            "taiko" => Ok(GameMode::Taiko),
            "fruits" | "catch" => Ok(GameMode::Fruits),
            "mania" => Ok(GameMode::Mania),
            other => Err(format!("unknown game mode: {}", other)),
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One gameplay modifier as the API reports it, e.g. "HD" or "DT".
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct GameMod {
    pub acronym: String,
}

/// A score as returned by the osu! v2 API. Read-only to this system;
/// `pp` stays `None` until the API has computed a value for the play.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Score {
    pub id: Option<u64>,
    pub legacy_score_id: Option<u64>,
    pub user_id: UserId,
    #[serde(rename = "ruleset_id")]
    pub mode: GameMode,
    pub pp: Option<f64>,
    /// Accuracy fraction in [0, 1].
    pub accuracy: f64,
    #[serde(default)]
    pub mods: Vec<GameMod>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Embedded by the top-scores endpoint; absent on bare score payloads.
    pub beatmap: Option<Beatmap>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Beatmap {
    pub id: BeatmapId,
    pub beatmapset_id: BeatmapsetId,
    /// Difficulty label within the set.
    pub version: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Beatmapset {
    pub id: BeatmapsetId,
    pub artist: String,
    pub title: String,
}
