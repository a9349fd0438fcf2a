mod compare;
mod score;

pub mod format;

pub use compare::{Comparison, ComparisonKind, classify};
pub use score::{Beatmap, Beatmapset, GameMod, GameMode, Score};

/// Identifier of an osu! user account, resolved once per comparison run.
pub type UserId = u32;

pub type BeatmapId = u32;

pub type BeatmapsetId = u32;
