// Core algorithm exports
pub mod criteria;
pub mod distance;
pub mod matcher;
pub mod similarity;
pub mod skills;

pub use criteria::{Criterion, ListingFilter, PageRequest, ProviderCriteria, SearchFilter, SortDirection, SortOrder};
pub use distance::{distance_km, haversine_distance};
pub use matcher::Matcher;
pub use similarity::cosine_similarity;
pub use skills::{overlap_count, SkillSpace};
