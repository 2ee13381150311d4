use std::collections::BTreeSet;

use crate::models::{CandidateItem, UserPreferences};

/// Vote count at which the confidence factor reaches half strength
const VOTE_CONFIDENCE_PIVOT: f64 = 50.0;

/// Quality factor floor, so sparsely-voted titles still register
const CONFIDENCE_FLOOR: f64 = 0.25;

/// Weight of the media-type alignment bonus
const MEDIA_TYPE_WEIGHT: f64 = 0.3;

/// Per-matched-genre bonus multiplier applied to the learned affinity
const GENRE_WEIGHT: f64 = 0.25;

/// Ceiling on the combined genre bonus
const GENRE_BONUS_CAP: f64 = 0.5;

/// Cap on the log-popularity term
const POPULARITY_CAP: f64 = 0.15;

/// Flat bonus for titles on the user's favorites list
///
/// Deliberately smaller than the quality separation between a vote average
/// of 2.0 and 9.5 at any vote count, so a bad favorite never outranks a
/// great non-favorite.
const FAVORITE_BOOST: f64 = 0.15;

/// Scores one candidate against a taste profile
///
/// Pure and total: junk `genre_ids` entries (zero, negative) are skipped
/// silently, and a candidate that was never marked favorite scores exactly
/// like one explicitly marked non-favorite. Returns the score and an
/// ordered, deterministic list of short reason strings.
pub fn score_candidate(candidate: &CandidateItem, prefs: &UserPreferences) -> (f64, Vec<String>) {
    let mut reasons = Vec::new();

    // Quality: monotone in vote average, discounted when few votes back it.
    let confidence =
        candidate.vote_count as f64 / (candidate.vote_count as f64 + VOTE_CONFIDENCE_PIVOT);
    let quality = (candidate.vote_average / 10.0).clamp(0.0, 1.0)
        * (CONFIDENCE_FLOOR + (1.0 - CONFIDENCE_FLOOR) * confidence);

    if candidate.vote_average >= 7.5 && candidate.vote_count >= 100 {
        reasons.push(format!("Highly rated ({:.1})", candidate.vote_average));
    }

    let popularity = (candidate.popularity.max(0.0).ln_1p() / 40.0).min(POPULARITY_CAP);
    if candidate.popularity >= 100.0 {
        reasons.push("Popular right now".to_string());
    }

    let media_alignment =
        MEDIA_TYPE_WEIGHT * prefs.preferred_media_types.ratio(candidate.media_type);

    let (genre_bonus, matched_genres) = genre_alignment(candidate, prefs);
    if matched_genres == 1 {
        reasons.push("Matches 1 favorite genre".to_string());
    } else if matched_genres > 1 {
        reasons.push(format!("Matches {} favorite genres", matched_genres));
    }

    let favorite_bonus = if candidate.is_favorite {
        reasons.push("One of your favorites".to_string());
        FAVORITE_BOOST
    } else {
        0.0
    };

    let score = quality + popularity + media_alignment + genre_bonus + favorite_bonus;
    (score, reasons)
}

/// Combined genre bonus and the number of distinct matched genres
fn genre_alignment(candidate: &CandidateItem, prefs: &UserPreferences) -> (f64, usize) {
    if prefs.favorite_genres.is_empty() {
        return (0.0, 0);
    }

    let valid_ids: BTreeSet<u32> = candidate
        .genre_ids
        .iter()
        .filter(|&&id| id > 0)
        .map(|&id| id as u32)
        .collect();

    let mut bonus = 0.0;
    let mut matched = 0;
    for id in valid_ids {
        if let Some(affinity) = prefs.favorite_genres.get(&id) {
            bonus += GENRE_WEIGHT * affinity;
            matched += 1;
        }
    }

    (bonus.min(GENRE_BONUS_CAP), matched)
}
