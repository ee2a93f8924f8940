use std::sync::Arc;
use crate::core::criteria::{ListingFilter, ProviderCriteria, SearchFilter};
use crate::models::{Listing, Page, ProviderProfile};
use crate::services::store::{ProviderStore, StoreError};

/// Criteria search over providers and listings
#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn ProviderStore>,
}

impl SearchService {
    pub fn new(store: Arc<dyn ProviderStore>) -> Self {
        Self { store }
    }

    /// Available providers matching the filter, one page at a time
    pub async fn search_providers(&self, filter: &SearchFilter) -> Result<Page<ProviderProfile>, StoreError> {
        let criteria = ProviderCriteria::from_filter(filter);
        tracing::debug!("Provider search with {} criteria", criteria.criteria().len());

        let page = self.store.search(&criteria, &filter.page).await?;

        tracing::info!(
            total = page.total_elements,
            returned = page.content.len(),
            page = filter.page.page,
            "Provider search complete"
        );

        Ok(page)
    }

    /// Listing search is not backed by any listing query yet; it always
    /// answers with an empty page in the requested envelope.
    // TODO: query the listing service once it exposes a filtered search endpoint
    pub async fn search_listings(&self, filter: &ListingFilter) -> Page<Listing> {
        tracing::info!(
            title = ?filter.title,
            skills = ?filter.skills,
            location = ?filter.location,
            min_budget = ?filter.min_budget,
            max_budget = ?filter.max_budget,
            "Listing search is not implemented, returning an empty page"
        );

        Page::empty(&filter.page)
    }

    pub async fn health_check(&self) -> bool {
        match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::error!("Profile store health check failed: {}", e);
                false
            }
        }
    }
}
