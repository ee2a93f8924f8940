// Unit tests for the skillmatch core

use skillmatch::core::{
    criteria::{PageRequest, ProviderCriteria, SearchFilter, SortDirection},
    distance::{distance_km, haversine_distance, EARTH_RADIUS_KM},
    similarity::cosine_similarity,
    skills::{overlap_count, SkillSpace},
    Matcher,
};
use skillmatch::models::{Coordinates, Listing, ListingStatus, ProviderProfile};
use uuid::Uuid;

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn provider(user_id: i64, skills: &[&str], rating: f64, lat: f64, lon: f64) -> ProviderProfile {
    ProviderProfile {
        id: Uuid::new_v4(),
        user_id,
        name: format!("Provider {}", user_id),
        email: format!("provider{}@example.com", user_id),
        phone: None,
        bio: None,
        skills: tags(skills),
        location: Coordinates::new(lat, lon),
        rating,
        is_available: true,
    }
}

fn listing(skills: &[&str], lat: f64, lon: f64) -> Listing {
    Listing {
        id: Some(1),
        title: "Bathroom refit".to_string(),
        description: None,
        skills: tags(skills),
        location: Coordinates::new(lat, lon),
        budget: 400.0,
        status: ListingStatus::Open,
        client_id: Some(10),
        technician_id: None,
    }
}

/// Kilometres expressed as degrees of latitude
fn km_north(km: f64) -> f64 {
    km / (EARTH_RADIUS_KM * std::f64::consts::PI / 180.0)
}

fn samples() -> Vec<Vec<String>> {
    vec![
        tags(&["plumbing"]),
        tags(&["plumbing", "pipe-fitting"]),
        tags(&["plumbing", "pipe-fitting", "welding"]),
        tags(&["plumbing", "plumbing", "tiling"]),
        tags(&["electrical", "hvac", "electrical", "electrical"]),
        tags(&["roofing", "carpentry", "painting", "plumbing"]),
    ]
}

#[test]
fn test_similarity_identity_is_one() {
    for a in samples() {
        assert_eq!(cosine_similarity(&a, &a), 1.0, "similarity({:?}, itself)", a);
    }
}

#[test]
fn test_similarity_symmetric() {
    for a in samples() {
        for b in samples() {
            assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
        }
    }
}

#[test]
fn test_similarity_bounded() {
    for a in samples() {
        for b in samples() {
            let s = cosine_similarity(&a, &b);
            assert!((0.0..=1.0).contains(&s));
        }
    }
}

#[test]
fn test_similarity_disjoint_and_empty() {
    let a = tags(&["plumbing", "tiling"]);
    let b = tags(&["electrical"]);
    assert_eq!(cosine_similarity(&a, &b), 0.0);
    assert_eq!(cosine_similarity(&a, &[]), 0.0);
    assert_eq!(cosine_similarity(&[], &a), 0.0);
    assert_eq!(cosine_similarity(&[], &[]), 0.0);
}

#[test]
fn test_repeated_tags_carry_weight() {
    let listing = tags(&["plumbing", "tiling"]);
    let once = tags(&["plumbing", "roofing"]);
    let twice = tags(&["plumbing", "plumbing", "roofing"]);

    // Same tag set, different multiplicities, different scores
    assert_ne!(
        cosine_similarity(&listing, &once),
        cosine_similarity(&listing, &twice)
    );
}

#[test]
fn test_skill_space_counts() {
    let left = tags(&["a", "b", "a"]);
    let right = tags(&["b", "c"]);
    let space = SkillSpace::new(&left, &right);

    let counts: Vec<(&str, u32, u32)> = space
        .dimensions()
        .iter()
        .map(|d| (d.tag, d.left, d.right))
        .collect();
    assert_eq!(counts, vec![("a", 2, 0), ("b", 1, 1), ("c", 0, 1)]);

    assert!(SkillSpace::new(&left, &[]).is_empty());
}

#[test]
fn test_overlap_counts_candidate_entries() {
    let anchor = tags(&["plumbing", "pipe-fitting"]);
    assert_eq!(overlap_count(&tags(&["plumbing", "pipe-fitting", "welding"]), &anchor), 2);
    assert_eq!(overlap_count(&tags(&["Plumbing"]), &anchor), 0);
    assert_eq!(overlap_count(&[], &anchor), 0);
}

#[test]
fn test_distance_zero_and_symmetric() {
    let points = [
        Coordinates::new(40.70, -74.00),
        Coordinates::new(51.5074, -0.1278),
        Coordinates::new(-33.8688, 151.2093),
        Coordinates::new(0.0, 1.0),
    ];

    for p in &points {
        assert_eq!(distance_km(p, p), 0.0);
        for q in &points {
            assert!((distance_km(p, q) - distance_km(q, p)).abs() < 1e-9);
        }
    }
}

#[test]
fn test_unknown_location_is_infinitely_far() {
    let known = Coordinates::new(40.70, -74.00);
    assert_eq!(distance_km(&known, &Coordinates::UNKNOWN), f64::MAX);
    assert_eq!(distance_km(&Coordinates::UNKNOWN, &known), f64::MAX);
    assert_eq!(distance_km(&Coordinates::UNKNOWN, &Coordinates::UNKNOWN), f64::MAX);
}

#[test]
fn test_haversine_manhattan_to_brooklyn() {
    let distance = haversine_distance(40.7580, -73.9855, 40.6782, -73.9442);
    assert!(distance > 5.0 && distance < 15.0);
}

#[test]
fn test_reference_scenario() {
    let matcher = Matcher::with_default_rules();
    let listing = listing(&["plumbing", "pipe-fitting"], 40.70, -74.00);
    let providers = vec![provider(1, &["plumbing", "pipe-fitting", "welding"], 4.5, 40.71, -74.01)];

    let result = matcher.rank_providers(&listing, providers);

    assert_eq!(result.len(), 1);
    let m = &result[0];
    assert!((m.similarity_score - 0.8165).abs() < 0.001);
    assert!(m.distance_km > 1.2 && m.distance_km < 1.5, "distance {}", m.distance_km);
    assert_eq!(m.skills_match_count, 2);
    assert_eq!(m.rating, 4.5);
}

#[test]
fn test_rating_floor_boundary() {
    let matcher = Matcher::with_default_rules();
    let listing = listing(&["plumbing"], 40.70, -74.00);
    let providers = vec![
        provider(1, &["plumbing"], 3.9, 40.701, -74.00),
        provider(2, &["plumbing"], 4.0, 40.701, -74.00),
    ];

    let ids: Vec<i64> = matcher
        .rank_providers(&listing, providers)
        .iter()
        .map(|m| m.candidate.identity())
        .collect();

    assert_eq!(ids, vec![2]);
}

#[test]
fn test_proximity_boundary() {
    let matcher = Matcher::with_default_rules();
    let listing = listing(&["plumbing"], 40.70, -74.00);
    let providers = vec![
        provider(1, &["plumbing"], 4.5, 40.70 + km_north(9.99), -74.00),
        provider(2, &["plumbing"], 4.5, 40.70 + km_north(10.01), -74.00),
    ];

    let result = matcher.rank_providers(&listing, providers);

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].candidate.identity(), 1);
    assert!((result[0].distance_km - 9.99).abs() < 1e-6);
}

#[test]
fn test_never_more_than_five_sorted() {
    let matcher = Matcher::with_default_rules();
    let listing = listing(&["plumbing", "tiling", "grouting"], 40.70, -74.00);

    let skill_sets: [&[&str]; 4] = [
        &["plumbing"],
        &["plumbing", "tiling"],
        &["plumbing", "tiling", "grouting"],
        &["tiling", "roofing"],
    ];
    let providers: Vec<ProviderProfile> = (0..12)
        .map(|i| {
            provider(
                i,
                skill_sets[i as usize % skill_sets.len()],
                4.0 + (i % 10) as f64 / 10.0,
                40.70 + i as f64 * 0.002,
                -74.00,
            )
        })
        .collect();

    let result = matcher.rank_providers(&listing, providers);

    assert_eq!(result.len(), 5);
    for pair in result.windows(2) {
        assert!(pair[0].similarity_score >= pair[1].similarity_score);
    }
    assert_eq!(result[0].similarity_score, 1.0);
}

#[test]
fn test_search_criteria_from_filter() {
    let filter = SearchFilter {
        skills: tags(&["plumbing"]),
        location: Some("40.70,-74.00".to_string()),
        min_rating: Some(4.5),
        max_distance_km: Some(10.0),
        page: PageRequest::of(0, 10, Some("rating"), None),
    };
    let criteria = ProviderCriteria::from_filter(&filter);

    assert_eq!(criteria.criteria().len(), 4);
    assert!(criteria.matches(&provider(1, &["plumbing"], 4.7, 40.71, -74.01)));
    assert!(!criteria.matches(&provider(2, &["plumbing"], 4.7, 0.0, 0.0)));
    assert!(!criteria.matches(&provider(3, &["plumbing"], 4.2, 40.71, -74.01)));
    assert_eq!(
        filter.page.sort.map(|s| s.direction),
        Some(SortDirection::Desc)
    );
}
