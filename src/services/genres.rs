use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{LibraryEntry, MediaType};
use crate::services::providers::CatalogProvider;

/// Contribution weight of one library item to its genres
///
/// Higher-rated items pull their genres up harder; unrated items count for
/// half weight, below any 3-star-or-better rating.
fn rating_weight(rating: Option<u8>) -> f64 {
    match rating {
        Some(r) => f64::from(r) / 5.0,
        None => 0.5,
    }
}

/// Learns per-genre affinity scores from the user's library
///
/// Issues one metadata lookup per item through the injected provider, all
/// concurrently, each bounded by `per_call_timeout`. Failures are isolated:
/// a fetch that errors or times out only loses that item's contribution.
/// The function itself never fails; with an empty library it returns an
/// empty map without touching the provider at all.
///
/// Scores are weight sums normalized by total library size, so they land in
/// (0, 1] and stay comparable across genres.
pub async fn analyze_genres(
    items: &[LibraryEntry],
    provider: Arc<dyn CatalogProvider>,
    per_call_timeout: Duration,
) -> BTreeMap<u32, f64> {
    if items.is_empty() {
        return BTreeMap::new();
    }

    struct Lookup {
        media_type: MediaType,
        id: String,
        weight: f64,
    }

    let mut tasks = Vec::new();
    for item in items {
        let lookup = Lookup {
            media_type: item.media_type,
            id: item.id.clone(),
            weight: rating_weight(item.user_rating),
        };
        let provider = provider.clone();

        let task = tokio::spawn(async move {
            let details = tokio::time::timeout(
                per_call_timeout,
                provider.fetch_details(lookup.media_type, &lookup.id),
            )
            .await;

            match details {
                Ok(Ok(details)) => Some((lookup.weight, details)),
                Ok(Err(e)) => {
                    tracing::debug!(
                        media_type = %lookup.media_type,
                        id = %lookup.id,
                        error = %e,
                        "Metadata lookup failed, skipping item"
                    );
                    None
                }
                Err(_) => {
                    tracing::debug!(
                        media_type = %lookup.media_type,
                        id = %lookup.id,
                        "Metadata lookup timed out, skipping item"
                    );
                    None
                }
            }
        });
        tasks.push(task);
    }

    let mut weight_sums: BTreeMap<u32, f64> = BTreeMap::new();
    let mut skipped = 0usize;

    for task in tasks {
        match task.await {
            Ok(Some((weight, details))) => {
                for genre in details.genres {
                    // Upstream payloads occasionally carry junk genre ids
                    if genre.id > 0 {
                        *weight_sums.entry(genre.id as u32).or_insert(0.0) += weight;
                    }
                }
            }
            Ok(None) => skipped += 1,
            Err(e) => {
                tracing::debug!(error = %e, "Metadata lookup task join error, skipping item");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(
            total = items.len(),
            skipped,
            "Genre analysis completed with partial results"
        );
    }

    let total = items.len() as f64;
    weight_sums
        .into_iter()
        .map(|(genre_id, sum)| (genre_id, sum / total))
        .collect()
}
