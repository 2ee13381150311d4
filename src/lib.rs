//! Recommendation core for a personal media tracker.
//!
//! Turns a user's viewing history into a ranked list of suggested titles:
//! preference analysis with statistical cold-start blending, learned genre
//! affinity, multi-signal candidate scoring, and a TTL-cached orchestration
//! layer over an injected catalog provider.
//!
//! The host application owns the library store and the UI; this crate only
//! reads library snapshots and returns `ScoredCandidate` lists.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::genres::analyze_genres;
pub use services::preferences::analyze;
pub use services::providers::{CatalogFeed, CatalogProvider, TmdbProvider};
pub use services::recommendations::Recommender;
pub use services::scoring::score_candidate;

/// Initializes tracing with an env-filterable subscriber
///
/// Intended for host binaries and integration tests; respects `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
