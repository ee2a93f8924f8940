// Service exports
pub mod cache;
pub mod directory;
pub mod listing_client;
pub mod matching;
pub mod postgres;
pub mod resilience;
pub mod search;
pub mod store;

pub use cache::{CacheError, CacheKey, MatchCache};
pub use directory::{
    DirectoryError, ListingDirectory, ListingSource, ProviderDirectory, ProviderSource,
    StaticListingFallback, StaticProviderFallback,
};
pub use listing_client::HttpListingSource;
pub use matching::MatchService;
pub use postgres::PostgresProviderStore;
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, ResilienceConfig, ResilienceGuard, RetryConfig};
pub use search::SearchService;
pub use store::{InMemoryProviderStore, ProviderStore, StoreError};
