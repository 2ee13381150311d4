/// Catalog data provider abstraction
///
/// The recommendation core never talks to the network directly; it is handed
/// a `CatalogProvider` by the host. This keeps the orchestrator and the
/// genre learner testable against in-memory providers and agnostic to the
/// transport behind them.
use std::fmt::Display;

use crate::{
    error::AppResult,
    models::{CandidateItem, MediaType, TitleDetails},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Candidate feeds the orchestrator fans out over on a cache miss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogFeed {
    /// Cross-media trending titles
    Trending,
    /// Top-rated movies
    TopRatedMovies,
    /// Top-rated TV shows
    TopRatedTv,
}

impl Display for CatalogFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogFeed::Trending => write!(f, "trending"),
            CatalogFeed::TopRatedMovies => write!(f, "top_rated_movies"),
            CatalogFeed::TopRatedTv => write!(f, "top_rated_tv"),
        }
    }
}

/// Trait for catalog metadata providers
///
/// Providers implement both paged feed listing (for candidate sourcing) and
/// per-title detail lookup (for genre learning).
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch one page of a candidate feed
    async fn fetch_feed_page(&self, feed: CatalogFeed, page: u32) -> AppResult<Vec<CandidateItem>>;

    /// Fetch title metadata (genre list) for one library item
    async fn fetch_details(&self, media_type: MediaType, id: &str) -> AppResult<TitleDetails>;
}
