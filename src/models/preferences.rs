use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::MediaType;

/// Ratio of movies vs TV shows in the user's library
///
/// The two fields always sum to 1 (within floating tolerance).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MediaTypeMix {
    pub movie: f64,
    pub tv: f64,
}

impl Default for MediaTypeMix {
    fn default() -> Self {
        Self { movie: 0.5, tv: 0.5 }
    }
}

impl MediaTypeMix {
    /// Ratio for one media type
    pub fn ratio(&self, media_type: MediaType) -> f64 {
        match media_type {
            MediaType::Movie => self.movie,
            MediaType::Tv => self.tv,
        }
    }
}

/// Per-user taste profile derived from a library snapshot
///
/// Recomputed on every analysis call, never persisted. Collections are
/// ordered (`BTreeMap`/`BTreeSet`) so JSON serialization is deterministic;
/// the orchestrator serializes this value into its cache key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPreferences {
    /// Learned genre-id -> affinity score, roughly in (0, 1]
    pub favorite_genres: BTreeMap<u32, f64>,
    pub preferred_media_types: MediaTypeMix,
    /// Blended average rating, always in [1, 5]
    pub average_rating: f64,
    /// `"{media_type}:{id}"` keys the user marked not interested
    pub not_interested_ids: BTreeSet<String>,
    /// `"{media_type}:{id}"` keys the user marked as favorites
    pub favorite_ids: BTreeSet<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            favorite_genres: BTreeMap::new(),
            preferred_media_types: MediaTypeMix::default(),
            average_rating: 3.0,
            not_interested_ids: BTreeSet::new(),
            favorite_ids: BTreeSet::new(),
        }
    }
}

impl UserPreferences {
    /// Whether the user marked this `"{media_type}:{id}"` key not interested
    pub fn is_not_interested(&self, key: &str) -> bool {
        self.not_interested_ids.contains(key)
    }

    /// Whether this `"{media_type}:{id}"` key is one of the user's favorites
    pub fn is_favorite(&self, key: &str) -> bool {
        self.favorite_ids.contains(key)
    }
}
