use crate::models::{Coordinates, ProviderProfile};
use std::cmp::Ordering;

/// Hard upper bound on page size regardless of caller input
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Missing direction means descending; anything other than "desc" is ascending
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => SortDirection::Desc,
            Some(dir) if dir.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            Some(_) => SortDirection::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub field: String,
    pub direction: SortDirection,
}

/// Caller-supplied pagination and ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Option<SortOrder>,
}

impl PageRequest {
    pub fn of(page: u32, size: u32, sort_by: Option<&str>, sort_dir: Option<&str>) -> Self {
        let sort = sort_by
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(|field| SortOrder {
                field: field.to_string(),
                direction: SortDirection::parse(sort_dir),
            });

        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort,
        }
    }

    pub fn unsorted(page: u32, size: u32) -> Self {
        Self::of(page, size, None, None)
    }

    pub fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }
}

/// Provider search request, rebuilt on every call
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub min_rating: Option<f64>,
    pub max_distance_km: Option<f64>,
    pub page: PageRequest,
}

/// Listing search request
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFilter {
    pub title: Option<String>,
    pub skills: Vec<String>,
    pub location: Option<String>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    pub page: PageRequest,
}

/// A single predicate over stored provider profiles
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Profile carries at least one of these tags
    SkillsAnyOf(Vec<String>),
    RatingAtLeast(f64),
    Available,
    /// Profile has a known location
    LocationPresent,
}

impl Criterion {
    pub fn matches(&self, profile: &ProviderProfile) -> bool {
        match self {
            Criterion::SkillsAnyOf(skills) => profile.skills.iter().any(|s| skills.contains(s)),
            Criterion::RatingAtLeast(min) => profile.rating >= *min,
            Criterion::Available => profile.is_available,
            Criterion::LocationPresent => !profile.location.is_unknown(),
        }
    }
}

/// Conjunction of criteria built from a [`SearchFilter`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderCriteria {
    criteria: Vec<Criterion>,
}

impl ProviderCriteria {
    pub fn from_filter(filter: &SearchFilter) -> Self {
        let mut criteria = Vec::new();

        if !filter.skills.is_empty() {
            criteria.push(Criterion::SkillsAnyOf(filter.skills.clone()));
        }

        if let Some(min) = filter.min_rating {
            criteria.push(Criterion::RatingAtLeast(min));
        }

        // No geo-radius evaluation here, only a presence check once the
        // search centre is known to be valid.
        if let (Some(location), Some(_)) = (&filter.location, filter.max_distance_km) {
            match Coordinates::parse(location) {
                Ok(_) => criteria.push(Criterion::LocationPresent),
                Err(e) => tracing::warn!("Dropping location criterion {:?}: {}", location, e),
            }
        }

        criteria.push(Criterion::Available);

        Self { criteria }
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    #[inline]
    pub fn matches(&self, profile: &ProviderProfile) -> bool {
        self.criteria.iter().all(|c| c.matches(profile))
    }
}

/// Profile fields a search may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSortField {
    Rating,
    Name,
    UserId,
}

impl ProviderSortField {
    pub fn parse(field: &str) -> Option<Self> {
        match field {
            "rating" => Some(ProviderSortField::Rating),
            "name" => Some(ProviderSortField::Name),
            "userId" | "user_id" => Some(ProviderSortField::UserId),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            ProviderSortField::Rating => "rating",
            ProviderSortField::Name => "name",
            ProviderSortField::UserId => "user_id",
        }
    }

    pub fn compare(&self, a: &ProviderProfile, b: &ProviderProfile) -> Ordering {
        match self {
            ProviderSortField::Rating => a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal),
            ProviderSortField::Name => a.name.cmp(&b.name),
            ProviderSortField::UserId => a.user_id.cmp(&b.user_id),
        }
    }
}

/// Resolve the requested sort against the provider fields, ignoring unknown ones
pub fn provider_sort(page: &PageRequest) -> Option<(ProviderSortField, SortDirection)> {
    let sort = page.sort.as_ref()?;
    match ProviderSortField::parse(&sort.field) {
        Some(field) => Some((field, sort.direction)),
        None => {
            tracing::warn!("Ignoring unsupported sort field: {}", sort.field);
            None
        }
    }
}

/// Sort profiles in place
pub fn sort_profiles(profiles: &mut [ProviderProfile], field: ProviderSortField, direction: SortDirection) {
    profiles.sort_by(|a, b| {
        let ord = field.compare(a, b);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile(user_id: i64, skills: &[&str], rating: f64, available: bool) -> ProviderProfile {
        ProviderProfile {
            id: Uuid::new_v4(),
            user_id,
            name: format!("Provider {}", user_id),
            email: String::new(),
            phone: None,
            bio: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            location: Coordinates::new(40.71, -74.01),
            rating,
            is_available: available,
        }
    }

    fn filter() -> SearchFilter {
        SearchFilter {
            skills: vec![],
            location: None,
            min_rating: None,
            max_distance_km: None,
            page: PageRequest::unsorted(0, 10),
        }
    }

    #[test]
    fn test_sort_direction_defaults() {
        assert_eq!(SortDirection::parse(None), SortDirection::Desc);
        assert_eq!(SortDirection::parse(Some("DESC")), SortDirection::Desc);
        assert_eq!(SortDirection::parse(Some("asc")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some("sideways")), SortDirection::Asc);
    }

    #[test]
    fn test_page_request_unsorted_without_field() {
        let page = PageRequest::of(2, 20, None, Some("asc"));
        assert!(page.sort.is_none());
        assert_eq!(page.offset(), 40);

        let page = PageRequest::of(0, 10, Some("rating"), None);
        assert_eq!(page.sort.unwrap().direction, SortDirection::Desc);
    }

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(PageRequest::unsorted(0, 0).size, 1);
        assert_eq!(PageRequest::unsorted(0, 5000).size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_availability_always_forced() {
        let criteria = ProviderCriteria::from_filter(&filter());
        assert_eq!(criteria.criteria(), &[Criterion::Available]);
        assert!(!criteria.matches(&profile(1, &["plumbing"], 5.0, false)));
    }

    #[test]
    fn test_skills_any_of_and_rating() {
        let mut f = filter();
        f.skills = vec!["welding".to_string(), "plumbing".to_string()];
        f.min_rating = Some(4.0);
        let criteria = ProviderCriteria::from_filter(&f);

        assert!(criteria.matches(&profile(1, &["plumbing"], 4.0, true)));
        assert!(!criteria.matches(&profile(2, &["plumbing"], 3.9, true)));
        assert!(!criteria.matches(&profile(3, &["carpentry"], 4.8, true)));
    }

    #[test]
    fn test_malformed_location_dropped() {
        let mut f = filter();
        f.location = Some("not-a-place".to_string());
        f.max_distance_km = Some(5.0);
        let criteria = ProviderCriteria::from_filter(&f);
        assert!(!criteria.criteria().contains(&Criterion::LocationPresent));

        f.location = Some("40.7,-74.0".to_string());
        let criteria = ProviderCriteria::from_filter(&f);
        assert!(criteria.criteria().contains(&Criterion::LocationPresent));
    }

    #[test]
    fn test_location_needs_max_distance() {
        let mut f = filter();
        f.location = Some("40.7,-74.0".to_string());
        let criteria = ProviderCriteria::from_filter(&f);
        assert!(!criteria.criteria().contains(&Criterion::LocationPresent));
    }

    #[test]
    fn test_sort_profiles_by_rating_desc() {
        let mut profiles = vec![
            profile(1, &[], 3.5, true),
            profile(2, &[], 4.9, true),
            profile(3, &[], 4.1, true),
        ];
        sort_profiles(&mut profiles, ProviderSortField::Rating, SortDirection::Desc);
        let ids: Vec<i64> = profiles.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_unknown_sort_field_ignored() {
        let page = PageRequest::of(0, 10, Some("password"), Some("asc"));
        assert!(provider_sort(&page).is_none());
    }
}
