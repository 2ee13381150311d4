mod candidate;
mod library;
mod preferences;

pub use candidate::{CandidateItem, GenreRef, ScoredCandidate, TitleDetails};
pub use library::{LibraryEntry, ListKind, MediaType};
pub use preferences::{MediaTypeMix, UserPreferences};
