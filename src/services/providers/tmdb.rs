/// TMDB API provider
///
/// Implements `CatalogProvider` against the TMDB v3 API:
/// - Feeds: /trending/all/week, /movie/top_rated, /tv/top_rated
/// - Details: /movie/{id}, /tv/{id}
///
/// Feed payloads are loosely typed (trending mixes movies, TV, and people;
/// most fields are optional), so deserialization happens into permissive raw
/// structs here at the boundary and is converted to the strict
/// `CandidateItem` immediately.
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{CandidateItem, MediaType, TitleDetails},
    services::providers::{CatalogFeed, CatalogProvider},
};

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tmdb_api_key.clone(), config.tmdb_api_url.clone())
    }

    /// Feed path and, for single-media feeds, the media type the payload omits
    fn feed_route(feed: CatalogFeed) -> (&'static str, Option<MediaType>) {
        match feed {
            CatalogFeed::Trending => ("trending/all/week", None),
            CatalogFeed::TopRatedMovies => ("movie/top_rated", Some(MediaType::Movie)),
            CatalogFeed::TopRatedTv => ("tv/top_rated", Some(MediaType::Tv)),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        page: Option<u32>,
    ) -> AppResult<T> {
        let url = format!("{}/{}", self.api_url, path);

        let mut request = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())]);
        if let Some(page) = page {
            request = request.query(&[("page", page)]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn fetch_feed_page(&self, feed: CatalogFeed, page: u32) -> AppResult<Vec<CandidateItem>> {
        let (path, fallback_type) = Self::feed_route(feed);
        let response: FeedResponse = self.get_json(path, Some(page)).await?;

        let items: Vec<CandidateItem> = response
            .results
            .into_iter()
            .filter_map(|raw| raw.into_candidate(fallback_type))
            .collect();

        tracing::info!(
            feed = %feed,
            page,
            results = items.len(),
            provider = "tmdb",
            "Feed page fetched"
        );

        Ok(items)
    }

    async fn fetch_details(&self, media_type: MediaType, id: &str) -> AppResult<TitleDetails> {
        if id.trim().is_empty() {
            return Err(AppError::InvalidInput("Title id cannot be empty".to_string()));
        }

        let path = format!("{}/{}", media_type, id);
        let details: TitleDetails = self.get_json(&path, None).await?;

        tracing::debug!(
            media_type = %media_type,
            id = %id,
            genres = details.genres.len(),
            provider = "tmdb",
            "Title details fetched"
        );

        Ok(details)
    }
}

/// Raw feed page payload
#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    results: Vec<RawFeedItem>,
}

/// One loosely-typed feed result
///
/// Movies carry `title`/`release_date`, TV carries `name`/`first_air_date`,
/// and trending additionally mixes in people, which have neither vote data
/// nor genres and are dropped during conversion.
#[derive(Debug, Deserialize)]
struct RawFeedItem {
    id: i64,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    first_air_date: Option<String>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    vote_count: u64,
    #[serde(default)]
    popularity: f64,
    #[serde(default)]
    genre_ids: Vec<i64>,
}

impl RawFeedItem {
    /// Converts to the strict candidate type, or `None` for unusable rows
    fn into_candidate(self, fallback_type: Option<MediaType>) -> Option<CandidateItem> {
        let media_type = match self.media_type.as_deref() {
            Some("movie") => MediaType::Movie,
            Some("tv") => MediaType::Tv,
            Some(_) => return None,
            None => fallback_type?,
        };

        let title = self.title.or(self.name)?;
        let year = self
            .release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .and_then(parse_year);

        Some(CandidateItem {
            id: self.id.to_string(),
            media_type,
            title,
            poster: self.poster_path,
            year,
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            popularity: self.popularity,
            genre_ids: self.genre_ids,
            is_favorite: false,
        })
    }
}

/// Year prefix of a `YYYY-MM-DD` date string
fn parse_year(date: &str) -> Option<i32> {
    date.get(..4)?.parse().ok()
}
