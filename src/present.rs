//! Console rendering of a finished comparison run.

use comparer_core::{Comparison, ComparisonKind, Score, format};

pub fn present(comparisons: &[Comparison], username_a: &str, username_b: &str) {
    for comparison in comparisons {
        print_comparison(comparison, username_a, username_b);
    }

    let count_of = |kind: ComparisonKind| {
        comparisons
            .iter()
            .filter(|comparison| comparison.kind == kind)
            .count()
    };
    println!(
        "{} reference plays: {} missing, {} weaker, {} stronger",
        comparisons.len(),
        count_of(ComparisonKind::Missing),
        count_of(ComparisonKind::Weaker),
        count_of(ComparisonKind::Stronger)
    );
}

fn print_comparison(comparison: &Comparison, username_a: &str, username_b: &str) {
    let score_b = &comparison.score_b;

    match comparison.kind {
        ComparisonKind::Missing => println!("{} has NO score on:", username_a),
        kind => println!("{}'s score is {} than {} on:", username_a, kind, username_b),
    }

    if let Some(beatmapset) = &comparison.beatmapset {
        let version = score_b
            .beatmap
            .as_ref()
            .map(|beatmap| beatmap.version.as_str())
            .unwrap_or("?");
        println!("{} - {} [{}]", beatmapset.artist, beatmapset.title, version);
    }

    if let Some(score_a) = &comparison.score_a {
        print_score_line(score_a, username_a);
    }
    print_score_line(score_b, username_b);

    if let Some(score_a) = &comparison.score_a {
        println!("{} link: {}", username_a, format::score_url(score_a));
    }
    println!("{} link: {}", username_b, format::score_url(score_b));
    if let Some(beatmap) = &score_b.beatmap {
        println!("Beatmap link: {}", format::beatmap_url(beatmap.id));
    }
    println!("pp difference: {:.2}\n", comparison.pp_delta);
}

fn print_score_line(score: &Score, username: &str) {
    println!(
        "{}: {:.2}pp, {:.2}%, Mods: {}",
        username,
        score.pp.unwrap_or(0.0),
        score.accuracy * 100.0,
        format::mods_to_string(score)
    );
}
