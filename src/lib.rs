//! Skillmatch - skill and proximity matching for a services marketplace
//!
//! Ranks providers for a listing (and open listings for a provider) by
//! cosine similarity of their skill tags, within a proximity radius, and
//! serves paged criteria search over provider profiles.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{cosine_similarity, distance_km, haversine_distance, Matcher};
pub use self::models::{Coordinates, Listing, MatchResult, MatchingRules, Page, ProviderProfile};
