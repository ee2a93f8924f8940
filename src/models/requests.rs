use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::core::criteria::{ListingFilter, PageRequest, SearchFilter};

/// Query string of `GET /search/providers`
///
/// Built from the raw key/value pairs so `skills` may repeat. A value that
/// does not parse is logged and its criterion dropped; the search still runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchProvidersQuery {
    pub skills: Vec<String>,
    /// Search centre as `"lat,lng"`
    pub location: Option<String>,
    pub min_rating: Option<f64>,
    pub max_distance: Option<f64>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl SearchProvidersQuery {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "skills" => query.skills.extend(split_tags(Some(&value))),
                "location" => query.location = Some(value).filter(|l| !l.trim().is_empty()),
                "minRating" => {
                    query.min_rating = lenient(&key, &value, |v: &f64| (0.0..=5.0).contains(v))
                }
                "maxDistance" => {
                    query.max_distance = lenient(&key, &value, |v: &f64| v.is_finite() && *v >= 0.0)
                }
                "page" => query.page = lenient(&key, &value, |_: &u32| true),
                "size" => query.size = lenient(&key, &value, |_: &u32| true),
                "sortBy" => query.sort_by = Some(value),
                "sortDir" => query.sort_dir = Some(value),
                _ => tracing::debug!("Ignoring unknown search parameter {:?}", key),
            }
        }

        query
    }

    pub fn into_filter(self, default_page_size: u32) -> SearchFilter {
        let page = PageRequest::of(
            self.page.unwrap_or(0),
            self.size.unwrap_or(default_page_size),
            self.sort_by.as_deref(),
            self.sort_dir.as_deref(),
        );

        SearchFilter {
            skills: self.skills,
            location: self.location,
            min_rating: self.min_rating,
            max_distance_km: self.max_distance,
            page,
        }
    }
}

fn lenient<T, F>(key: &str, raw: &str, accept: F) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&T) -> bool,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.parse::<T>() {
        Ok(value) if accept(&value) => Some(value),
        _ => {
            tracing::warn!("Dropping search parameter {}={:?}", key, raw);
            None
        }
    }
}

/// Query string of `GET /search/listings`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_budget_range"))]
pub struct SearchListingsQuery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "minBudget", default)]
    pub min_budget: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "maxBudget", default)]
    pub max_budget: Option<f64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(rename = "sortBy", default)]
    pub sort_by: Option<String>,
    #[serde(rename = "sortDir", default)]
    pub sort_dir: Option<String>,
}

impl SearchListingsQuery {
    pub fn into_filter(self, default_page_size: u32) -> ListingFilter {
        let page = PageRequest::of(
            self.page.unwrap_or(0),
            self.size.unwrap_or(default_page_size),
            self.sort_by.as_deref(),
            self.sort_dir.as_deref(),
        );

        ListingFilter {
            title: self.title.filter(|t| !t.trim().is_empty()),
            skills: split_tags(self.skills.as_deref()),
            location: self.location.filter(|l| !l.trim().is_empty()),
            min_budget: self.min_budget,
            max_budget: self.max_budget,
            page,
        }
    }
}

fn validate_budget_range(query: &SearchListingsQuery) -> Result<(), ValidationError> {
    match (query.min_budget, query.max_budget) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::new("budget_range")),
        _ => Ok(()),
    }
}

fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
