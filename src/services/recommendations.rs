use chrono::Duration as ChronoDuration;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::RecommendationCache;
use crate::clock::{Clock, SystemClock};
use crate::error::{AppError, AppResult};
use crate::models::{CandidateItem, LibraryEntry, ScoredCandidate, UserPreferences};
use crate::services::providers::{CatalogFeed, CatalogProvider};
use crate::services::scoring::score_candidate;

/// How long a ranked list stays valid before it is recomputed
const RECOMMENDATION_TTL_SECS: i64 = 300;

/// Number of feeds fanned out on a cache miss (trending, top movies, top TV,
/// two pages each)
const FEED_FAN_OUT: usize = 6;

/// Generates personalized recommendations from catalog feeds
///
/// On a cache miss the six feed pages are fetched concurrently, merged,
/// deduplicated, filtered against the user's not-interested set, scored, and
/// ranked. The ranked list is cached under a key derived from the user id,
/// preferences, and library snapshot, so any input change recomputes while
/// repeat calls within the TTL cost zero upstream requests.
pub struct Recommender {
    provider: Arc<dyn CatalogProvider>,
    cache: RecommendationCache,
    fetch_timeout: Duration,
}

impl Recommender {
    pub fn new(provider: Arc<dyn CatalogProvider>, fetch_timeout: Duration) -> Self {
        Self::with_clock(provider, fetch_timeout, Arc::new(SystemClock))
    }

    pub fn from_config(provider: Arc<dyn CatalogProvider>, config: &crate::config::Config) -> Self {
        Self {
            provider,
            cache: RecommendationCache::new(
                ChronoDuration::seconds(config.cache_ttl_secs as i64),
                Arc::new(SystemClock),
            ),
            fetch_timeout: config.fetch_timeout(),
        }
    }

    /// Constructor with an injected clock, for deterministic TTL tests
    pub fn with_clock(
        provider: Arc<dyn CatalogProvider>,
        fetch_timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            cache: RecommendationCache::new(
                ChronoDuration::seconds(RECOMMENDATION_TTL_SECS),
                clock,
            ),
            fetch_timeout,
        }
    }

    /// Returns the top `limit` scored candidates for this user
    ///
    /// `library` is the current snapshot and participates in the cache key
    /// only; entries the user is not interested in are excluded via
    /// `prefs.not_interested_ids`.
    pub async fn get_recommendations(
        &self,
        user_id: &str,
        prefs: &UserPreferences,
        library: &[LibraryEntry],
        limit: usize,
    ) -> AppResult<Vec<ScoredCandidate>> {
        let cache_key = cache_key(user_id, prefs, library)?;

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(user_id = %user_id, "Recommendation cache hit");
            return Ok(cached);
        }
        tracing::debug!(user_id = %user_id, "Recommendation cache miss");

        let (trending_1, trending_2, movies_1, movies_2, tv_1, tv_2) = tokio::join!(
            self.fetch_feed_or_empty(CatalogFeed::Trending, 1),
            self.fetch_feed_or_empty(CatalogFeed::Trending, 2),
            self.fetch_feed_or_empty(CatalogFeed::TopRatedMovies, 1),
            self.fetch_feed_or_empty(CatalogFeed::TopRatedMovies, 2),
            self.fetch_feed_or_empty(CatalogFeed::TopRatedTv, 1),
            self.fetch_feed_or_empty(CatalogFeed::TopRatedTv, 2),
        );

        let buckets = [trending_1, trending_2, movies_1, movies_2, tv_1, tv_2];
        let failed = buckets.iter().filter(|b| b.is_none()).count();
        if failed == FEED_FAN_OUT {
            return Err(AppError::ExternalApi(
                "All catalog feeds failed".to_string(),
            ));
        }
        if failed > 0 {
            tracing::warn!(
                failed,
                total = FEED_FAN_OUT,
                "Some catalog feeds degraded to empty results"
            );
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut ranked: Vec<ScoredCandidate> = Vec::new();

        for candidate in buckets.into_iter().flatten().flatten() {
            let key = candidate.library_key();
            if !seen.insert(key.clone()) {
                continue;
            }
            if prefs.is_not_interested(&key) {
                continue;
            }

            let candidate = CandidateItem {
                is_favorite: prefs.is_favorite(&key),
                ..candidate
            };

            let (score, reasons) = score_candidate(&candidate, prefs);
            ranked.push(ScoredCandidate {
                item: candidate,
                score,
                reasons,
            });
        }

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(limit);

        tracing::info!(
            user_id = %user_id,
            candidates = seen.len(),
            returned = ranked.len(),
            "Recommendations generated"
        );

        self.cache.insert(cache_key, ranked.clone());
        Ok(ranked)
    }

    /// One feed fetch bounded by the per-call timeout
    ///
    /// A failed or timed-out feed degrades to `None` rather than failing the
    /// whole orchestration; the caller decides what an all-feeds failure
    /// means.
    async fn fetch_feed_or_empty(
        &self,
        feed: CatalogFeed,
        page: u32,
    ) -> Option<Vec<CandidateItem>> {
        let fetch = self.provider.fetch_feed_page(feed, page);
        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(items)) => Some(items),
            Ok(Err(e)) => {
                tracing::warn!(feed = %feed, page, error = %e, "Feed fetch failed");
                None
            }
            Err(_) => {
                tracing::warn!(feed = %feed, page, "Feed fetch timed out");
                None
            }
        }
    }
}

/// Composite cache key over everything that can change the result
fn cache_key(
    user_id: &str,
    prefs: &UserPreferences,
    library: &[LibraryEntry],
) -> AppResult<String> {
    let prefs_json = serde_json::to_string(prefs)
        .map_err(|e| AppError::Internal(format!("Cache key serialization error: {}", e)))?;
    let library_json = serde_json::to_string(library)
        .map_err(|e| AppError::Internal(format!("Cache key serialization error: {}", e)))?;
    Ok(format!("recs:{}|{}|{}", user_id, prefs_json, library_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::{ListKind, MediaType};
    use crate::services::providers::MockCatalogProvider;
    use chrono::Utc;

    fn feed_item(id: &str, media_type: MediaType, vote_average: f64) -> CandidateItem {
        CandidateItem {
            id: id.to_string(),
            media_type,
            title: format!("Title {}", id),
            poster: None,
            year: Some(2020),
            vote_average,
            vote_count: 1000,
            popularity: 50.0,
            genre_ids: vec![18],
            is_favorite: false,
        }
    }

    fn library_entry(id: &str) -> LibraryEntry {
        LibraryEntry {
            id: id.to_string(),
            media_type: MediaType::Movie,
            title: format!("Title {}", id),
            list: ListKind::Watched,
            added_at: None,
            user_rating: None,
            rating_updated_at: None,
            is_favorite: false,
        }
    }

    fn scripted_provider(calls: usize) -> MockCatalogProvider {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_fetch_feed_page()
            .times(calls)
            .returning(|feed, page| {
                let media_type = match feed {
                    CatalogFeed::TopRatedTv => MediaType::Tv,
                    _ => MediaType::Movie,
                };
                Ok(vec![
                    feed_item(&format!("{}-{}-a", feed, page), media_type, 7.0),
                    feed_item(&format!("{}-{}-b", feed, page), media_type, 6.0),
                ])
            });
        provider
    }

    fn recommender(provider: MockCatalogProvider, clock: Arc<ManualClock>) -> Recommender {
        Recommender::with_clock(Arc::new(provider), Duration::from_millis(500), clock)
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl_issues_no_fetches() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        // Exactly six fetches across both calls
        let rec = recommender(scripted_provider(6), clock.clone());
        let prefs = UserPreferences::default();

        let first = rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();
        clock.advance(ChronoDuration::minutes(4));
        let second = rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches_all_feeds() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let rec = recommender(scripted_provider(12), clock.clone());
        let prefs = UserPreferences::default();

        rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();
        clock.advance(ChronoDuration::minutes(6));
        rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_users_do_not_share_cache_entries() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let rec = recommender(scripted_provider(12), clock);
        let prefs = UserPreferences::default();

        rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();
        rec.get_recommendations("u2", &prefs, &[], 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_preference_change_misses_cache() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let rec = recommender(scripted_provider(12), clock);

        let prefs = UserPreferences::default();
        rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();

        let mut changed = prefs.clone();
        changed.average_rating = 4.2;
        rec.get_recommendations("u1", &changed, &[], 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_library_change_misses_cache() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let rec = recommender(scripted_provider(12), clock);
        let prefs = UserPreferences::default();

        rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();
        let library = vec![library_entry("42")];
        rec.get_recommendations("u1", &prefs, &library, 10).await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicates_across_feeds_are_merged() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_fetch_feed_page()
            .times(6)
            .returning(|_, _| Ok(vec![feed_item("same", MediaType::Movie, 7.0)]));

        let rec = recommender(provider, clock);
        let prefs = UserPreferences::default();
        let results = rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_not_interested_titles_are_excluded() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut provider = MockCatalogProvider::new();
        provider.expect_fetch_feed_page().times(6).returning(|_, _| {
            Ok(vec![
                feed_item("keep", MediaType::Movie, 7.0),
                feed_item("skip", MediaType::Movie, 9.0),
            ])
        });

        let rec = recommender(provider, clock);
        let mut prefs = UserPreferences::default();
        prefs.not_interested_ids.insert("movie:skip".to_string());

        let results = rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.id, "keep");
    }

    #[tokio::test]
    async fn test_favorites_are_flagged_and_boosted() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut provider = MockCatalogProvider::new();
        provider.expect_fetch_feed_page().times(6).returning(|_, _| {
            Ok(vec![
                feed_item("fav", MediaType::Movie, 7.0),
                feed_item("plain", MediaType::Movie, 7.0),
            ])
        });

        let rec = recommender(provider, clock);
        let mut prefs = UserPreferences::default();
        prefs.favorite_ids.insert("movie:fav".to_string());

        let results = rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();
        assert_eq!(results[0].item.id, "fav");
        assert!(results[0].item.is_favorite);
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_results_sorted_descending_and_truncated() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut provider = MockCatalogProvider::new();
        provider.expect_fetch_feed_page().times(6).returning(|feed, page| {
            Ok(vec![feed_item(
                &format!("{}-{}", feed, page),
                MediaType::Movie,
                5.0 + page as f64,
            )])
        });

        let rec = recommender(provider, clock);
        let prefs = UserPreferences::default();
        let results = rec.get_recommendations("u1", &prefs, &[], 3).await.unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[tokio::test]
    async fn test_partial_feed_failure_degrades_gracefully() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_fetch_feed_page()
            .times(6)
            .returning(|feed, page| match feed {
                CatalogFeed::Trending => {
                    Err(AppError::ExternalApi("trending down".to_string()))
                }
                _ => Ok(vec![feed_item(
                    &format!("{}-{}", feed, page),
                    MediaType::Movie,
                    7.0,
                )]),
            });

        let rec = recommender(provider, clock);
        let prefs = UserPreferences::default();
        let results = rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn test_all_feeds_failing_is_an_error() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_fetch_feed_page()
            .times(6)
            .returning(|_, _| Err(AppError::ExternalApi("catalog down".to_string())));

        let rec = recommender(provider, clock);
        let prefs = UserPreferences::default();
        let result = rec.get_recommendations("u1", &prefs, &[], 10).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_empty_feeds_are_not_an_error() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_fetch_feed_page()
            .times(6)
            .returning(|_, _| Ok(vec![]));

        let rec = recommender(provider, clock);
        let prefs = UserPreferences::default();
        let results = rec.get_recommendations("u1", &prefs, &[], 10).await.unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_cache_key_reflects_all_inputs() {
        let prefs = UserPreferences::default();
        let base = cache_key("u1", &prefs, &[]).unwrap();

        assert_ne!(base, cache_key("u2", &prefs, &[]).unwrap());

        let mut changed = prefs.clone();
        changed.average_rating = 4.0;
        assert_ne!(base, cache_key("u1", &changed, &[]).unwrap());

        let library = vec![library_entry("1")];
        assert_ne!(base, cache_key("u1", &prefs, &library).unwrap());

        assert_eq!(base, cache_key("u1", &UserPreferences::default(), &[]).unwrap());
    }
}
