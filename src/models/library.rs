use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type of content (movie or TV show)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Movie => write!(f, "movie"),
            MediaType::Tv => write!(f, "tv"),
        }
    }
}

/// Which of the user's lists an entry lives on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Watching,
    Wishlist,
    Watched,
}

/// One user-owned media record, read from the host's library store
///
/// The recommendation core treats a snapshot of these as immutable for the
/// duration of one analysis call; it never writes them back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryEntry {
    /// Catalog id of the title
    pub id: String,
    pub media_type: MediaType,
    pub title: String,
    pub list: ListKind,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    /// Star rating, 1-5
    #[serde(default)]
    pub user_rating: Option<u8>,
    /// When the rating was last changed; expected whenever `user_rating` is set
    #[serde(default)]
    pub rating_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl LibraryEntry {
    /// Identity used by the not-interested and favorite sets, e.g. `movie:550`
    pub fn library_key(&self) -> String {
        format!("{}:{}", self.media_type, self.id)
    }
}
