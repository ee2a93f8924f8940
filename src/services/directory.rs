use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;
use crate::models::{Coordinates, Listing, ListingStatus, ProviderProfile};
use crate::services::resilience::ResilienceGuard;
use crate::services::store::StoreError;

/// Errors a live directory source can report
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned status {0}")]
    Upstream(u16),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Profile store error: {0}")]
    Store(#[from] StoreError),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Circuit open for {0}")]
    CircuitOpen(String),
}

impl DirectoryError {
    /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            DirectoryError::Request(_) | DirectoryError::Timeout(_) | DirectoryError::Store(_) => true,
            DirectoryError::Upstream(status) => *status >= 500 || *status == 429,
            DirectoryError::NotFound(_)
            | DirectoryError::InvalidResponse(_)
            | DirectoryError::CircuitOpen(_) => false,
        }
    }
}

/// Source of listings (the listing service, or a stand-in)
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn get_listing(&self, listing_id: i64) -> Result<Listing, DirectoryError>;

    async fn list_open_listings(&self) -> Result<Vec<Listing>, DirectoryError>;
}

/// Source of provider profiles
#[async_trait]
pub trait ProviderSource: Send + Sync {
    async fn get_provider(&self, user_id: i64) -> Result<ProviderProfile, DirectoryError>;

    async fn list_available_providers(&self) -> Result<Vec<ProviderProfile>, DirectoryError>;
}

/// Degraded-mode listings: a placeholder for single lookups, nothing for bulk ones
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticListingFallback;

impl StaticListingFallback {
    pub fn placeholder() -> Listing {
        Listing {
            id: None,
            title: "Service Unavailable".to_string(),
            description: Some("Listing service is currently unavailable".to_string()),
            skills: vec!["General".to_string()],
            location: Coordinates::UNKNOWN,
            budget: 0.0,
            status: ListingStatus::Unavailable,
            client_id: None,
            technician_id: None,
        }
    }
}

#[async_trait]
impl ListingSource for StaticListingFallback {
    async fn get_listing(&self, _listing_id: i64) -> Result<Listing, DirectoryError> {
        Ok(Self::placeholder())
    }

    async fn list_open_listings(&self) -> Result<Vec<Listing>, DirectoryError> {
        Ok(Vec::new())
    }
}

/// Degraded-mode providers: a placeholder for single lookups, nothing for bulk ones
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProviderFallback;

impl StaticProviderFallback {
    pub fn placeholder(user_id: i64) -> ProviderProfile {
        ProviderProfile {
            id: Uuid::nil(),
            user_id,
            name: "Unknown User".to_string(),
            email: "unknown@example.com".to_string(),
            phone: None,
            bio: None,
            skills: vec!["General".to_string()],
            location: Coordinates::UNKNOWN,
            rating: 3.0,
            is_available: false,
        }
    }
}

#[async_trait]
impl ProviderSource for StaticProviderFallback {
    async fn get_provider(&self, user_id: i64) -> Result<ProviderProfile, DirectoryError> {
        Ok(Self::placeholder(user_id))
    }

    async fn list_available_providers(&self) -> Result<Vec<ProviderProfile>, DirectoryError> {
        Ok(Vec::new())
    }
}

/// Listing lookups that never fail
///
/// Calls go to the live source under the resilience guard; any error is
/// logged and answered by the fallback source instead.
#[derive(Clone)]
pub struct ListingDirectory {
    live: Arc<dyn ListingSource>,
    fallback: Arc<dyn ListingSource>,
    guard: ResilienceGuard,
}

impl ListingDirectory {
    pub fn new(live: Arc<dyn ListingSource>, guard: ResilienceGuard) -> Self {
        Self::with_fallback(live, Arc::new(StaticListingFallback), guard)
    }

    pub fn with_fallback(
        live: Arc<dyn ListingSource>,
        fallback: Arc<dyn ListingSource>,
        guard: ResilienceGuard,
    ) -> Self {
        Self { live, fallback, guard }
    }

    pub fn guard(&self) -> &ResilienceGuard {
        &self.guard
    }

    pub async fn get_listing(&self, listing_id: i64) -> Listing {
        match self.guard.call(|| self.live.get_listing(listing_id)).await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::warn!("Listing {} lookup failed, using fallback: {}", listing_id, e);
                self.fallback
                    .get_listing(listing_id)
                    .await
                    .unwrap_or_else(|_| StaticListingFallback::placeholder())
            }
        }
    }

    pub async fn list_open_listings(&self) -> Vec<Listing> {
        match self.guard.call(|| self.live.list_open_listings()).await {
            Ok(listings) => listings,
            Err(e) => {
                tracing::warn!("Open listings lookup failed, using fallback: {}", e);
                self.fallback.list_open_listings().await.unwrap_or_default()
            }
        }
    }
}

/// Provider lookups that never fail
#[derive(Clone)]
pub struct ProviderDirectory {
    live: Arc<dyn ProviderSource>,
    fallback: Arc<dyn ProviderSource>,
    guard: ResilienceGuard,
}

impl ProviderDirectory {
    pub fn new(live: Arc<dyn ProviderSource>, guard: ResilienceGuard) -> Self {
        Self::with_fallback(live, Arc::new(StaticProviderFallback), guard)
    }

    pub fn with_fallback(
        live: Arc<dyn ProviderSource>,
        fallback: Arc<dyn ProviderSource>,
        guard: ResilienceGuard,
    ) -> Self {
        Self { live, fallback, guard }
    }

    pub fn guard(&self) -> &ResilienceGuard {
        &self.guard
    }

    pub async fn get_provider(&self, user_id: i64) -> ProviderProfile {
        match self.guard.call(|| self.live.get_provider(user_id)).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Provider {} lookup failed, using fallback: {}", user_id, e);
                self.fallback
                    .get_provider(user_id)
                    .await
                    .unwrap_or_else(|_| StaticProviderFallback::placeholder(user_id))
            }
        }
    }

    pub async fn list_available_providers(&self) -> Vec<ProviderProfile> {
        match self.guard.call(|| self.live.list_available_providers()).await {
            Ok(providers) => providers,
            Err(e) => {
                tracing::warn!("Available providers lookup failed, using fallback: {}", e);
                self.fallback.list_available_providers().await.unwrap_or_default()
            }
        }
    }
}
