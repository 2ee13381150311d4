use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::models::{LibraryEntry, MediaType, MediaTypeMix, UserPreferences};

/// Library size below which the neutral prior is blended in
const MIN_SAMPLE_SIZE: usize = 5;

/// Neutral prior rating used during cold start
const PRIOR_RATING: f64 = 3.0;

/// Half-life of the recency weighting, in days
const RECENCY_HALF_LIFE_DAYS: f64 = 180.0;

/// Derives a taste profile from a library snapshot
///
/// Pure and total: degenerate inputs (empty library, no ratings) resolve to
/// the documented defaults rather than failing. `favorites` may be passed
/// explicitly; otherwise they are inferred from `is_favorite` flags on the
/// items. `now` anchors the recency weighting and is injected so callers can
/// simulate elapsed time.
///
/// The returned profile has an empty `favorite_genres`; callers that want
/// learned genre affinity fill it in via `analyze_genres`.
pub fn analyze(
    items: &[LibraryEntry],
    not_interested: &[LibraryEntry],
    favorites: Option<&[LibraryEntry]>,
    now: DateTime<Utc>,
) -> UserPreferences {
    let preferred_media_types = media_type_mix(items);
    let average_rating = average_rating(items, now);

    let not_interested_ids: BTreeSet<String> =
        not_interested.iter().map(LibraryEntry::library_key).collect();

    let favorite_ids: BTreeSet<String> = match favorites {
        Some(explicit) => explicit.iter().map(LibraryEntry::library_key).collect(),
        None => items
            .iter()
            .filter(|item| item.is_favorite)
            .map(LibraryEntry::library_key)
            .collect(),
    };

    UserPreferences {
        favorite_genres: Default::default(),
        preferred_media_types,
        average_rating,
        not_interested_ids,
        favorite_ids,
    }
}

/// Movie/TV ratio over the snapshot; 0.5/0.5 for an empty library
fn media_type_mix(items: &[LibraryEntry]) -> MediaTypeMix {
    if items.is_empty() {
        return MediaTypeMix::default();
    }

    let total = items.len() as f64;
    let movies = items
        .iter()
        .filter(|item| item.media_type == MediaType::Movie)
        .count() as f64;

    MediaTypeMix {
        movie: movies / total,
        tv: (total - movies) / total,
    }
}

/// Blended average rating
///
/// The cold-start threshold is driven by the total item count, not the
/// rated-item count: a user with many unrated items and only two ratings
/// still takes the no-prior branch once the library reaches five entries.
fn average_rating(items: &[LibraryEntry], now: DateTime<Utc>) -> f64 {
    let rated: Vec<&LibraryEntry> = items.iter().filter(|i| i.user_rating.is_some()).collect();

    if rated.is_empty() {
        return PRIOR_RATING;
    }

    let result = if items.len() < MIN_SAMPLE_SIZE {
        // Cold start: blend the simple mean with the neutral prior,
        // shifting weight toward the user as the library grows.
        let user_avg = rated
            .iter()
            .map(|i| f64::from(i.user_rating.unwrap_or(0)))
            .sum::<f64>()
            / rated.len() as f64;

        let user_weight = items.len() as f64 / MIN_SAMPLE_SIZE as f64;
        let prior_weight = 1.0 - user_weight;
        prior_weight * PRIOR_RATING + user_weight * user_avg
    } else {
        // Enough data: recency-weighted mean over rated items only.
        let mut weight_sum = 0.0;
        let mut weighted_total = 0.0;
        for item in &rated {
            let weight = recency_weight(item, now);
            weight_sum += weight;
            weighted_total += weight * f64::from(item.user_rating.unwrap_or(0));
        }

        if weight_sum > 0.0 {
            weighted_total / weight_sum
        } else {
            PRIOR_RATING
        }
    };

    result.clamp(1.0, 5.0)
}

/// Exponential decay with a 180-day half-life over the rating's age
///
/// Equal timestamps get equal weights, so a library rated all at once
/// collapses to a simple mean. Falls back to `added_at` when the rating
/// timestamp is missing, and to full weight when both are absent.
fn recency_weight(item: &LibraryEntry, now: DateTime<Utc>) -> f64 {
    let stamped_at = match item.rating_updated_at.or(item.added_at) {
        Some(ts) => ts,
        None => return 1.0,
    };

    let age_days = (now - stamped_at).num_seconds().max(0) as f64 / 86_400.0;
    0.5_f64.powf(age_days / RECENCY_HALF_LIFE_DAYS)
}
