use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::models::ScoredCandidate;

/// One stored recommendation list with its creation time
#[derive(Debug, Clone)]
struct CacheEntry {
    items: Vec<ScoredCandidate>,
    created_at: DateTime<Utc>,
}

/// In-process TTL cache for ranked recommendation lists
///
/// Keys are composite strings derived from the user id, preferences, and
/// library snapshot; any input change produces a new key. Entries are valid
/// for the TTL after creation. There is no proactive eviction: an expired
/// entry simply fails the read-side check and is overwritten by the next
/// store under the same key.
pub struct RecommendationCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl RecommendationCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Returns the stored list if the key exists and has not expired
    pub fn get(&self, key: &str) -> Option<Vec<ScoredCandidate>> {
        let entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(e) => {
                // A poisoned lock means a panic mid-write; treat as a miss.
                tracing::warn!(error = %e, "Recommendation cache lock poisoned, treating as miss");
                return None;
            }
        };

        let entry = entries.get(key)?;
        if self.clock.now() - entry.created_at < self.ttl {
            Some(entry.items.clone())
        } else {
            None
        }
    }

    /// Stores a list under the key, stamped with the current time
    pub fn insert(&self, key: String, items: Vec<ScoredCandidate>) {
        let entry = CacheEntry {
            items,
            created_at: self.clock.now(),
        };

        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key, entry);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Recommendation cache lock poisoned, dropping write");
            }
        }
    }
}
