pub mod genres;
pub mod preferences;
pub mod providers;
pub mod recommendations;
pub mod scoring;
