use crate::models::{Coordinates, Listing, MatchCandidate, MatchResult, MatchingRules, ProviderProfile};
use crate::core::{distance::distance_km, similarity::cosine_similarity, skills::overlap_count};
use std::cmp::Ordering;

/// Ranking pipeline shared by both match directions
///
/// # Pipeline Stages
/// 1. Quality floor (provider candidates only)
/// 2. Skill similarity and distance scoring
/// 3. Proximity filter
/// 4. Sort and truncate to the configured limit
#[derive(Debug, Clone)]
pub struct Matcher {
    rules: MatchingRules,
}

impl Matcher {
    pub fn new(rules: MatchingRules) -> Self {
        Self { rules }
    }

    pub fn with_default_rules() -> Self {
        Self {
            rules: MatchingRules::default(),
        }
    }

    pub fn rules(&self) -> &MatchingRules {
        &self.rules
    }

    /// Rank providers for a listing
    pub fn rank_providers(&self, listing: &Listing, providers: Vec<ProviderProfile>) -> Vec<MatchResult> {
        if listing.skills.is_empty() {
            return Vec::new();
        }

        let scored = providers
            .into_iter()
            .filter(|provider| provider.rating >= self.rules.min_provider_rating)
            .map(|provider| {
                let (similarity_score, distance_km, skills_match_count) = score_pair(
                    &listing.skills,
                    &listing.location,
                    &provider.skills,
                    &provider.location,
                );
                MatchResult {
                    rating: provider.rating,
                    candidate: MatchCandidate::Provider(provider),
                    similarity_score,
                    distance_km,
                    skills_match_count,
                }
            })
            .collect();

        self.select_top(scored)
    }

    /// Rank listings for a provider
    ///
    /// No rating floor applies here since listings carry no rating. Each
    /// result reports the anchor provider's rating.
    pub fn rank_listings(&self, provider: &ProviderProfile, listings: Vec<Listing>) -> Vec<MatchResult> {
        if provider.skills.is_empty() {
            return Vec::new();
        }

        let scored = listings
            .into_iter()
            .map(|listing| {
                let (similarity_score, distance_km, skills_match_count) = score_pair(
                    &provider.skills,
                    &provider.location,
                    &listing.skills,
                    &listing.location,
                );
                MatchResult {
                    candidate: MatchCandidate::Listing(listing),
                    similarity_score,
                    distance_km,
                    rating: provider.rating,
                    skills_match_count,
                }
            })
            .collect();

        self.select_top(scored)
    }

    fn select_top(&self, scored: Vec<MatchResult>) -> Vec<MatchResult> {
        let mut matches: Vec<MatchResult> = scored
            .into_iter()
            .filter(|m| m.distance_km <= self.rules.proximity_km)
            .collect();

        // Similarity descending, then distance ascending, then identity
        matches.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    a.distance_km
                        .partial_cmp(&b.distance_km)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.candidate.identity().cmp(&b.candidate.identity()))
        });

        matches.truncate(self.rules.max_results);
        matches
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// Similarity, distance and overlap count of a candidate against an anchor
#[inline]
fn score_pair(
    anchor_skills: &[String],
    anchor_location: &Coordinates,
    candidate_skills: &[String],
    candidate_location: &Coordinates,
) -> (f64, f64, usize) {
    (
        cosine_similarity(anchor_skills, candidate_skills),
        distance_km(anchor_location, candidate_location),
        overlap_count(candidate_skills, anchor_skills),
    )
}
