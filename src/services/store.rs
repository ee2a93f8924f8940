use async_trait::async_trait;
use thiserror::Error;
use crate::core::criteria::{provider_sort, sort_profiles, PageRequest, ProviderCriteria};
use crate::models::{Page, ProviderProfile};
use crate::services::directory::{DirectoryError, ProviderSource};

/// Errors that can occur when reading the profile store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Criteria-driven reads over stored provider profiles
#[async_trait]
pub trait ProviderStore: Send + Sync {
    async fn search(
        &self,
        criteria: &ProviderCriteria,
        page: &PageRequest,
    ) -> Result<Page<ProviderProfile>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Profile store held in process memory
///
/// Used when no database is configured, and by tests.
#[derive(Debug, Default)]
pub struct InMemoryProviderStore {
    profiles: Vec<ProviderProfile>,
}

impl InMemoryProviderStore {
    pub fn new(profiles: Vec<ProviderProfile>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl ProviderStore for InMemoryProviderStore {
    async fn search(
        &self,
        criteria: &ProviderCriteria,
        page: &PageRequest,
    ) -> Result<Page<ProviderProfile>, StoreError> {
        let mut matching: Vec<ProviderProfile> = self
            .profiles
            .iter()
            .filter(|p| criteria.matches(p))
            .cloned()
            .collect();

        let total = matching.len() as u64;

        if let Some((field, direction)) = provider_sort(page) {
            sort_profiles(&mut matching, field, direction);
        }

        let content = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();

        Ok(Page::new(content, page, total))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[async_trait]
impl ProviderSource for InMemoryProviderStore {
    async fn get_provider(&self, user_id: i64) -> Result<ProviderProfile, DirectoryError> {
        self.profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", user_id)).into())
    }

    async fn list_available_providers(&self) -> Result<Vec<ProviderProfile>, DirectoryError> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| p.is_available)
            .cloned()
            .collect())
    }
}
