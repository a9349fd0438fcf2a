use std::sync::Arc;

use comparer_core::{BeatmapId, Beatmapset, BeatmapsetId, Comparison, Score, UserId, classify};
use futures_util::{StreamExt, stream};
use log::info;

use crate::api::{ArcScoreGateway, GatewayError, GatewayResult};
use crate::config::Settings;

/// Observer for completed sub-fetches during a fan-out phase. Observable
/// behavior only; the comparison result does not depend on it.
pub trait ProgressSink: Send + Sync {
    fn start(&self, total: u64);
    fn tick(&self);
    fn finish(&self);
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn start(&self, _total: u64) {}
    fn tick(&self) {}
    fn finish(&self) {}
}

/// Orchestrates one comparison run: resolves both users, fetches the
/// reference user's top plays, then fans out over the per-beatmap score
/// and metadata lookups with bounded concurrency.
pub struct Comparer {
    gateway: ArcScoreGateway,
    score_limit: usize,
    concurrent_requests: usize,
}

impl Comparer {
    pub fn new(gateway: ArcScoreGateway, settings: &Settings) -> Self {
        Self {
            gateway,
            score_limit: settings.score_limit,
            concurrent_requests: settings.concurrent_requests,
        }
    }

    /// Compare `username_a`'s scores against `username_b`'s top plays.
    ///
    /// The result list positionally matches `username_b`'s top-play list
    /// regardless of the completion order of the concurrent lookups.
    /// Dropping the returned future cancels all in-flight requests.
    pub async fn run(
        &self,
        username_a: &str,
        username_b: &str,
        limit: usize,
        progress: &dyn ProgressSink,
    ) -> GatewayResult<Vec<Comparison>> {
        let user_a = self.gateway.resolve_user(username_a).await?;
        let user_b = self.gateway.resolve_user(username_b).await?;

        let limit = limit.min(self.score_limit);
        info!("Fetching top plays for {}", username_b);
        let scores_b = self.gateway.top_scores(user_b, limit).await?;

        let mut map_ids = Vec::with_capacity(scores_b.len());
        let mut mapset_ids = Vec::with_capacity(scores_b.len());
        for score in &scores_b {
            let map = score.beatmap.as_ref().ok_or_else(|| {
                GatewayError::Malformed("top score without embedded beatmap".to_string())
            })?;
            map_ids.push(map.id);
            mapset_ids.push(map.beatmapset_id);
        }

        info!(
            "Fetching scores for {} on {} beatmaps",
            username_a,
            map_ids.len()
        );
        let scores_a = self.fetch_scores_of(user_a, &map_ids, progress).await?;

        info!("Fetching beatmapset metadata for {} beatmaps", map_ids.len());
        let mapsets = self.fetch_mapsets(&mapset_ids, progress).await?;

        let mut comparisons: Vec<Comparison> = scores_a
            .into_iter()
            .zip(scores_b)
            .map(|(score_a, score_b)| classify(score_a, score_b))
            .collect();
        for (comparison, mapset) in comparisons.iter_mut().zip(mapsets) {
            comparison.attach_beatmapset(mapset);
        }

        Ok(comparisons)
    }

    /// User A's score per beatmap. A beatmap without a score resolves to
    /// `None`; each result lands in the slot matching the beatmap's
    /// position in the reference list, whatever order the requests finish.
    async fn fetch_scores_of(
        &self,
        user: UserId,
        map_ids: &[BeatmapId],
        progress: &dyn ProgressSink,
    ) -> GatewayResult<Vec<Option<Score>>> {
        progress.start(map_ids.len() as u64);
        let tasks: Vec<_> = map_ids
            .iter()
            .copied()
            .enumerate()
            .map(|(index, map_id)| {
                let gateway = Arc::clone(&self.gateway);
                async move { (index, gateway.user_score_on_map(user, map_id).await) }
            })
            .collect();

        let mut slots: Vec<Option<Score>> = Vec::new();
        slots.resize_with(map_ids.len(), || None);
        let mut completions = stream::iter(tasks).buffer_unordered(self.concurrent_requests);
        while let Some((index, result)) = completions.next().await {
            slots[index] = result?;
            progress.tick();
        }
        progress.finish();
        Ok(slots)
    }

    /// Beatmapset metadata per beatmap, same bounded fan-out. Unlike the
    /// score lookup, any failure here aborts the whole run.
    async fn fetch_mapsets(
        &self,
        mapset_ids: &[BeatmapsetId],
        progress: &dyn ProgressSink,
    ) -> GatewayResult<Vec<Beatmapset>> {
        progress.start(mapset_ids.len() as u64);
        let tasks: Vec<_> = mapset_ids
            .iter()
            .copied()
            .enumerate()
            .map(|(index, mapset_id)| {
                let gateway = Arc::clone(&self.gateway);
                async move { (index, gateway.beatmapset(mapset_id).await) }
            })
            .collect();

        let mut slots: Vec<Option<Beatmapset>> = Vec::new();
        slots.resize_with(mapset_ids.len(), || None);
        let mut completions = stream::iter(tasks).buffer_unordered(self.concurrent_requests);
        while let Some((index, result)) = completions.next().await {
            slots[index] = Some(result?);
            progress.tick();
        }
        progress.finish();

        // every slot was written exactly once above
        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use comparer_core::{
        Beatmap, BeatmapId, Beatmapset, BeatmapsetId, ComparisonKind, GameMode, Score, UserId,
    };

    use super::*;
    use crate::api::{GatewayError, GatewayResult, ScoreGateway};
    use crate::config::Settings;

    struct MockGateway {
        users: HashMap<String, UserId>,
        top: Vec<Score>,
        scores_a: HashMap<BeatmapId, Score>,
        mapsets: HashMap<BeatmapsetId, Beatmapset>,
        /// Artificial response delay per beatmap, to shuffle completion order.
        delays: HashMap<BeatmapId, u64>,
        resolve_calls: Arc<AtomicUsize>,
        top_calls: Arc<AtomicUsize>,
        score_calls: Arc<AtomicUsize>,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                users: HashMap::new(),
                top: Vec::new(),
                scores_a: HashMap::new(),
                mapsets: HashMap::new(),
                delays: HashMap::new(),
                resolve_calls: Arc::new(AtomicUsize::new(0)),
                top_calls: Arc::new(AtomicUsize::new(0)),
                score_calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait::async_trait]
    impl ScoreGateway for MockGateway {
        async fn resolve_user(&self, username: &str) -> GatewayResult<UserId> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            self.users
                .get(username)
                .copied()
                .ok_or_else(|| GatewayError::UserNotFound(username.to_string()))
        }

        async fn top_scores(&self, _user: UserId, limit: usize) -> GatewayResult<Vec<Score>> {
            self.top_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.top.iter().take(limit).cloned().collect())
        }

        async fn user_score_on_map(
            &self,
            _user: UserId,
            map: BeatmapId,
        ) -> GatewayResult<Option<Score>> {
            self.score_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ms) = self.delays.get(&map) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            Ok(self.scores_a.get(&map).cloned())
        }

        async fn beatmapset(&self, mapset: BeatmapsetId) -> GatewayResult<Beatmapset> {
            self.mapsets
                .get(&mapset)
                .cloned()
                .ok_or_else(|| GatewayError::Malformed(format!("no beatmapset {}", mapset)))
        }
    }

    fn settings(score_limit: usize) -> Settings {
        Settings {
            client_id: 0,
            client_secret: String::new(),
            mode: GameMode::Osu,
            score_limit,
            concurrent_requests: 4,
        }
    }

    fn top_score(map: BeatmapId, mapset: BeatmapsetId, pp: f64) -> Score {
        Score {
            id: Some(map as u64 + 1000),
            legacy_score_id: None,
            user_id: 2,
            mode: GameMode::Osu,
            pp: Some(pp),
            accuracy: 0.99,
            mods: Vec::new(),
            ended_at: None,
            beatmap: Some(Beatmap {
                id: map,
                beatmapset_id: mapset,
                version: format!("diff {}", map),
            }),
        }
    }

    fn a_score(pp: Option<f64>) -> Score {
        Score {
            id: Some(1),
            legacy_score_id: None,
            user_id: 1,
            mode: GameMode::Osu,
            pp,
            accuracy: 0.95,
            mods: Vec::new(),
            ended_at: None,
            beatmap: None,
        }
    }

    fn mapset(id: BeatmapsetId) -> Beatmapset {
        Beatmapset {
            id,
            artist: format!("artist {}", id),
            title: format!("title {}", id),
        }
    }

    fn comparer(mock: MockGateway, score_limit: usize) -> Comparer {
        let gateway: ArcScoreGateway = Arc::new(Box::new(mock));
        Comparer::new(gateway, &settings(score_limit))
    }

    #[tokio::test(start_paused = true)]
    async fn result_order_matches_reference_order() {
        let mut mock = MockGateway::new();
        mock.users.insert("alice".to_string(), 1);
        mock.users.insert("bob".to_string(), 2);
        for map in 1..=5u32 {
            mock.top.push(top_score(map, map * 10, 200.0));
            mock.mapsets.insert(map * 10, mapset(map * 10));
            // earlier positions answer last
            mock.delays.insert(map, (6 - map as u64) * 100);
        }
        mock.scores_a.insert(1, a_score(Some(150.0)));
        mock.scores_a.insert(3, a_score(Some(250.0)));

        let comparisons = comparer(mock, 100)
            .run("alice", "bob", 5, &NoProgress)
            .await
            .unwrap();

        assert_eq!(comparisons.len(), 5);
        for (position, comparison) in comparisons.iter().enumerate() {
            let map = position as u32 + 1;
            assert_eq!(
                comparison.score_b.beatmap.as_ref().unwrap().id,
                map,
                "position {} must hold beatmap {}",
                position,
                map
            );
            assert_eq!(comparison.beatmapset.as_ref().unwrap().id, map * 10);
        }
        assert_eq!(comparisons[0].kind, ComparisonKind::Weaker);
        assert_eq!(comparisons[0].pp_delta, 50.0);
        assert_eq!(comparisons[1].kind, ComparisonKind::Missing);
        assert_eq!(comparisons[2].kind, ComparisonKind::Stronger);
        assert_eq!(comparisons[3].kind, ComparisonKind::Missing);
        assert_eq!(comparisons[4].kind, ComparisonKind::Missing);
    }

    #[tokio::test]
    async fn missing_score_is_not_a_fault() {
        let mut mock = MockGateway::new();
        mock.users.insert("alice".to_string(), 1);
        mock.users.insert("bob".to_string(), 2);
        mock.top.push(top_score(7, 70, 321.0));
        mock.mapsets.insert(70, mapset(70));

        let comparisons = comparer(mock, 100)
            .run("alice", "bob", 1, &NoProgress)
            .await
            .unwrap();

        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].kind, ComparisonKind::Missing);
        assert_eq!(comparisons[0].pp_delta, 321.0);
        assert!(comparisons[0].score_a.is_none());
    }

    #[tokio::test]
    async fn unknown_user_aborts_before_any_fetch() {
        let mut mock = MockGateway::new();
        mock.users.insert("bob".to_string(), 2);
        mock.top.push(top_score(7, 70, 321.0));
        let resolve_calls = Arc::clone(&mock.resolve_calls);
        let top_calls = Arc::clone(&mock.top_calls);
        let score_calls = Arc::clone(&mock.score_calls);

        let err = comparer(mock, 100)
            .run("nobody", "bob", 1, &NoProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::UserNotFound(name) if name == "nobody"));
        assert_eq!(resolve_calls.load(Ordering::SeqCst), 1);
        assert_eq!(top_calls.load(Ordering::SeqCst), 0);
        assert_eq!(score_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn limit_is_clamped_to_the_configured_maximum() {
        let mut mock = MockGateway::new();
        mock.users.insert("alice".to_string(), 1);
        mock.users.insert("bob".to_string(), 2);
        for map in 1..=5u32 {
            mock.top.push(top_score(map, map * 10, 100.0));
            mock.mapsets.insert(map * 10, mapset(map * 10));
        }

        let comparisons = comparer(mock, 3)
            .run("alice", "bob", 100, &NoProgress)
            .await
            .unwrap();

        assert_eq!(comparisons.len(), 3);
    }

    #[tokio::test]
    async fn metadata_failure_aborts_the_run() {
        let mut mock = MockGateway::new();
        mock.users.insert("alice".to_string(), 1);
        mock.users.insert("bob".to_string(), 2);
        mock.top.push(top_score(7, 70, 321.0));
        // no mapset 70 registered

        let err = comparer(mock, 100)
            .run("alice", "bob", 1, &NoProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Malformed(_)));
    }
}
