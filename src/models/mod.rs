// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Coordinates, LocationParseError, ProviderProfile, Listing, ListingStatus, MatchCandidate, MatchResult, MatchingRules};
pub use requests::{SearchProvidersQuery, SearchListingsQuery};
pub use responses::{CircuitHealth, Page, HealthResponse, ErrorResponse};
