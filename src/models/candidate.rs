use serde::{Deserialize, Serialize};

use super::MediaType;

/// An externally-sourced title under consideration for recommendation
///
/// `genre_ids` carries the raw catalog values, which may include junk
/// entries (zero, negative); the scorer filters them rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateItem {
    pub id: String,
    pub media_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    /// Catalog vote average, 0-10
    pub vote_average: f64,
    pub vote_count: u64,
    pub popularity: f64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    /// Set by the orchestrator when the title is in the user's favorites
    #[serde(default)]
    pub is_favorite: bool,
}

impl CandidateItem {
    /// Identity matching `LibraryEntry::library_key`, e.g. `movie:550`
    pub fn library_key(&self) -> String {
        format!("{}:{}", self.media_type, self.id)
    }
}

/// A candidate together with its score and human-readable reasons
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub item: CandidateItem,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Genre reference as returned by the catalog's detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreRef {
    pub id: i64,
    pub name: String,
}

/// Title metadata used by the genre affinity learner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TitleDetails {
    #[serde(default)]
    pub genres: Vec<GenreRef>,
}
