use std::sync::Arc;
use crate::core::Matcher;
use crate::models::{CircuitHealth, MatchResult};
use crate::services::cache::{CacheError, CacheKey, MatchCache};
use crate::services::directory::{ListingDirectory, ProviderDirectory};

/// Orchestrates both match directions
///
/// Anchors and candidates come from the directories, which never fail, so
/// every call yields a (possibly empty) ranked list.
#[derive(Clone)]
pub struct MatchService {
    listings: ListingDirectory,
    providers: ProviderDirectory,
    matcher: Matcher,
    cache: Option<Arc<MatchCache>>,
}

impl MatchService {
    pub fn new(listings: ListingDirectory, providers: ProviderDirectory, matcher: Matcher) -> Self {
        Self {
            listings,
            providers,
            matcher,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<MatchCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Breaker state of both directories
    pub fn circuits(&self) -> Vec<CircuitHealth> {
        vec![
            self.listings.guard().breaker().health(),
            self.providers.guard().breaker().health(),
        ]
    }

    /// Up to `max_results` providers for a listing, best first
    pub async fn find_matches_for_listing(&self, listing_id: i64) -> Vec<MatchResult> {
        let key = CacheKey::listing_matches(listing_id);
        if let Some(cached) = self.cached(&key).await {
            return cached;
        }

        let listing = self.listings.get_listing(listing_id).await;
        if listing.skills.is_empty() {
            tracing::debug!("Listing {} has no skills, skipping provider fetch", listing_id);
            return Vec::new();
        }

        let providers = self.providers.list_available_providers().await;
        let candidates = providers.len();
        let matches = self.matcher.rank_providers(&listing, providers);

        tracing::info!(
            listing_id,
            candidates,
            matches = matches.len(),
            "Ranked providers for listing"
        );

        self.store(&key, &matches).await;
        matches
    }

    /// Up to `max_results` open listings for a provider, best first
    pub async fn find_matches_for_provider(&self, user_id: i64) -> Vec<MatchResult> {
        let key = CacheKey::provider_matches(user_id);
        if let Some(cached) = self.cached(&key).await {
            return cached;
        }

        let provider = self.providers.get_provider(user_id).await;
        if provider.skills.is_empty() {
            tracing::debug!("Provider {} has no skills, skipping listing fetch", user_id);
            return Vec::new();
        }

        let listings = self.listings.list_open_listings().await;
        let candidates = listings.len();
        let matches = self.matcher.rank_listings(&provider, listings);

        tracing::info!(
            user_id,
            candidates,
            matches = matches.len(),
            "Ranked listings for provider"
        );

        self.store(&key, &matches).await;
        matches
    }

    async fn cached(&self, key: &str) -> Option<Vec<MatchResult>> {
        let cache = self.cache.as_ref()?;
        match cache.get::<Vec<MatchResult>>(key).await {
            Ok(matches) => {
                tracing::debug!("Serving {} from cache", key);
                Some(matches)
            }
            Err(CacheError::CacheMiss(_)) => None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    // Empty results stay uncached so a recovering collaborator shows up at once.
    async fn store(&self, key: &str, matches: &[MatchResult]) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        if matches.is_empty() {
            return;
        }
        if let Err(e) = cache.set(key, &matches).await {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }
    }
}
