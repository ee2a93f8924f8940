use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;
use crate::core::criteria::{provider_sort, Criterion, PageRequest, ProviderCriteria};
use crate::models::{Coordinates, Page, ProviderProfile};
use crate::services::directory::{DirectoryError, ProviderSource};
use crate::services::store::{ProviderStore, StoreError};

const PROFILE_COLUMNS: &str =
    "id, user_id, name, email, phone, bio, skills, latitude, longitude, rating, is_available";

/// PostgreSQL-backed provider profile store
///
/// Profiles are written by the profile owner's service; this client only
/// reads them, for match candidate loading and criteria search.
pub struct PostgresProviderStore {
    pool: PgPool,
}

impl PostgresProviderStore {
    /// Connect and run migrations
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_profile(row: &PgRow) -> Result<ProviderProfile, sqlx::Error> {
        Ok(ProviderProfile {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            bio: row.try_get("bio")?,
            skills: row.try_get("skills")?,
            location: Coordinates::new(row.try_get("latitude")?, row.try_get("longitude")?),
            rating: row.try_get("rating")?,
            is_available: row.try_get("is_available")?,
        })
    }

    fn rows_to_profiles(rows: &[PgRow]) -> Result<Vec<ProviderProfile>, sqlx::Error> {
        rows.iter().map(Self::row_to_profile).collect()
    }
}

/// Append a WHERE clause for the criteria
fn push_criteria(qb: &mut QueryBuilder<'_, Postgres>, criteria: &ProviderCriteria) {
    qb.push(" WHERE TRUE");

    for criterion in criteria.criteria() {
        match criterion {
            Criterion::SkillsAnyOf(skills) => {
                qb.push(" AND skills && ").push_bind(skills.clone());
            }
            Criterion::RatingAtLeast(min) => {
                qb.push(" AND rating >= ").push_bind(*min);
            }
            Criterion::Available => {
                qb.push(" AND is_available = TRUE");
            }
            Criterion::LocationPresent => {
                qb.push(" AND NOT (latitude = 0 AND longitude = 0)");
            }
        }
    }
}

/// Build the paged SELECT for a search
fn build_search_query<'a>(criteria: &ProviderCriteria, page: &PageRequest) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM provider_profiles", PROFILE_COLUMNS));
    push_criteria(&mut qb, criteria);

    if let Some((field, direction)) = provider_sort(page) {
        // Column and direction come from fixed whitelists, never from input
        qb.push(format!(" ORDER BY {} {}, user_id ASC", field.column(), direction.as_sql()));
    }

    qb.push(" LIMIT ").push_bind(page.size as i64);
    qb.push(" OFFSET ").push_bind(page.offset() as i64);
    qb
}

#[async_trait]
impl ProviderStore for PostgresProviderStore {
    async fn search(
        &self,
        criteria: &ProviderCriteria,
        page: &PageRequest,
    ) -> Result<Page<ProviderProfile>, StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM provider_profiles");
        push_criteria(&mut count, criteria);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = build_search_query(criteria, page);
        let rows = select.build().fetch_all(&self.pool).await?;
        let content = Self::rows_to_profiles(&rows)?;

        tracing::debug!("Provider search returned {} of {} profiles", content.len(), total);

        Ok(Page::new(content, page, total.max(0) as u64))
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl ProviderSource for PostgresProviderStore {
    async fn get_provider(&self, user_id: i64) -> Result<ProviderProfile, DirectoryError> {
        let query = format!("SELECT {} FROM provider_profiles WHERE user_id = $1", PROFILE_COLUMNS);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", user_id)))?;

        Ok(Self::row_to_profile(&row).map_err(StoreError::from)?)
    }

    async fn list_available_providers(&self) -> Result<Vec<ProviderProfile>, DirectoryError> {
        let query = format!(
            "SELECT {} FROM provider_profiles WHERE is_available = TRUE",
            PROFILE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from)?;

        let profiles = Self::rows_to_profiles(&rows).map_err(StoreError::from)?;
        tracing::debug!("Loaded {} available providers", profiles.len());

        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::SearchFilter;

    fn filter(skills: &[&str], min_rating: Option<f64>, location: Option<&str>) -> SearchFilter {
        SearchFilter {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            location: location.map(str::to_string),
            min_rating,
            max_distance_km: Some(10.0),
            page: PageRequest::of(2, 20, Some("rating"), Some("asc")),
        }
    }

    #[test]
    fn test_search_sql_shape() {
        let f = filter(&["plumbing"], Some(4.0), Some("40.7,-74.0"));
        let criteria = ProviderCriteria::from_filter(&f);
        let qb = build_search_query(&criteria, &f.page);
        let sql = qb.sql();

        assert!(sql.contains("skills && $1"));
        assert!(sql.contains("rating >= $2"));
        assert!(sql.contains("NOT (latitude = 0 AND longitude = 0)"));
        assert!(sql.contains("is_available = TRUE"));
        assert!(sql.contains("ORDER BY rating ASC, user_id ASC"));
        assert!(sql.ends_with("LIMIT $3 OFFSET $4"));
    }

    #[test]
    fn test_unknown_sort_field_not_interpolated() {
        let mut f = filter(&[], None, None);
        f.page = PageRequest::of(0, 10, Some("rating; DROP TABLE provider_profiles"), None);
        let criteria = ProviderCriteria::from_filter(&f);
        let qb = build_search_query(&criteria, &f.page);

        assert!(!qb.sql().contains("ORDER BY"));
        assert!(!qb.sql().contains("DROP"));
    }
}
