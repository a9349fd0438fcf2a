//! Permalink and display formatting for scores.

use crate::{BeatmapId, Score};

pub const SITE_URL: &str = "https://osu.ppy.sh";

/// Permalink to a score on the osu! website. Scores that predate the
/// current score table only carry a legacy id, addressed per game mode;
/// a score with neither id has no page at all.
pub fn score_url(score: &Score) -> String {
    if let Some(id) = score.id {
        return format!("{}/scores/{}", SITE_URL, id);
    }
    if let Some(legacy_id) = score.legacy_score_id {
        return format!("{}/scores/{}/{}", SITE_URL, score.mode, legacy_id);
    }
    "N/A".to_string()
}

/// Mod acronyms concatenated in the order the API reports them,
/// or "NM" for an unmodded score.
pub fn mods_to_string(score: &Score) -> String {
    if score.mods.is_empty() {
        return "NM".to_string();
    }
    score
        .mods
        .iter()
        .map(|game_mod| game_mod.acronym.as_str())
        .collect()
}

pub fn beatmap_url(beatmap_id: BeatmapId) -> String {
    format!("{}/b/{}", SITE_URL, beatmap_id)
}
