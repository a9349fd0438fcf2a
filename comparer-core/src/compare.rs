use std::fmt;

use crate::{Beatmapset, Score};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonKind {
    /// User A has no score on the beatmap, or their score has no pp value yet.
    Missing,
    /// User A's pp is strictly below the reference pp.
    Weaker,
    /// User A's pp is at least the reference pp. Exact ties land here.
    Stronger,
}

impl ComparisonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonKind::Missing => "MISSING",
            ComparisonKind::Weaker => "WEAKER",
            ComparisonKind::Stronger => "STRONGER",
        }
    }
}

impl fmt::Display for ComparisonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the comparison result, positionally matching the reference
/// user's top-play list.
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub kind: ComparisonKind,
    /// Absent exactly when `kind` is [`ComparisonKind::Missing`].
    pub score_a: Option<Score>,
    /// The reference score being compared against.
    pub score_b: Score,
    /// Attached once the metadata fetch for the beatmap completes.
    pub beatmapset: Option<Beatmapset>,
    /// `score_b.pp` for a missing pairing, `score_b.pp - score_a.pp`
    /// otherwise (non-positive for a stronger one).
    pub pp_delta: f64,
}

impl Comparison {
    pub fn attach_beatmapset(&mut self, beatmapset: Beatmapset) {
        self.beatmapset = Some(beatmapset);
    }
}

/// Classify user A's score against user B's reference score.
///
/// Total over all inputs: a reference score without a pp value counts as
/// 0.0 for delta purposes. A tie in pp classifies as `Stronger`; this
/// mirrors the long-standing behavior and must not be "fixed" silently.
pub fn classify(score_a: Option<Score>, score_b: Score) -> Comparison {
    let reference_pp = score_b.pp.unwrap_or(0.0);
    match score_a.as_ref().and_then(|score| score.pp) {
        None => Comparison {
            kind: ComparisonKind::Missing,
            score_a: None,
            score_b,
            beatmapset: None,
            pp_delta: reference_pp,
        },
        Some(pp) if pp < reference_pp => Comparison {
            kind: ComparisonKind::Weaker,
            score_a,
            score_b,
            beatmapset: None,
            pp_delta: reference_pp - pp,
        },
        Some(pp) => Comparison {
            kind: ComparisonKind::Stronger,
            score_a,
            score_b,
            beatmapset: None,
            pp_delta: reference_pp - pp,
        },
    }
}
