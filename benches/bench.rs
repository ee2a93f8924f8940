// Criterion benchmarks for skillmatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skillmatch::core::{
    criteria::{PageRequest, ProviderCriteria, SearchFilter},
    distance::haversine_distance,
    similarity::cosine_similarity,
    Matcher,
};
use skillmatch::models::{Coordinates, Listing, ListingStatus, ProviderProfile};
use uuid::Uuid;

const SKILLS: [&str; 8] = [
    "plumbing",
    "pipe-fitting",
    "welding",
    "tiling",
    "electrical",
    "hvac",
    "carpentry",
    "roofing",
];

fn skills_for(id: usize, count: usize) -> Vec<String> {
    (0..count).map(|k| SKILLS[(id + k * 3) % SKILLS.len()].to_string()).collect()
}

fn create_provider(id: usize, lat: f64, lon: f64) -> ProviderProfile {
    ProviderProfile {
        id: Uuid::new_v4(),
        user_id: id as i64,
        name: format!("Provider {}", id),
        email: format!("provider{}@example.com", id),
        phone: None,
        bio: None,
        skills: skills_for(id, 1 + id % 4),
        location: Coordinates::new(lat, lon),
        rating: 3.5 + (id % 16) as f64 / 10.0,
        is_available: true,
    }
}

fn create_listing() -> Listing {
    Listing {
        id: Some(1),
        title: "Kitchen plumbing".to_string(),
        description: None,
        skills: vec!["plumbing".to_string(), "pipe-fitting".to_string(), "tiling".to_string()],
        location: Coordinates::new(40.7128, -74.0060),
        budget: 300.0,
        status: ListingStatus::Open,
        client_id: Some(1),
        technician_id: None,
    }
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(40.7128),
                black_box(-74.0060),
                black_box(40.72),
                black_box(-74.01),
            )
        });
    });
}

fn bench_cosine_similarity(c: &mut Criterion) {
    let listing = skills_for(0, 4);
    let provider = skills_for(3, 6);

    c.bench_function("cosine_similarity", |b| {
        b.iter(|| cosine_similarity(black_box(&listing), black_box(&provider)));
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::with_default_rules();
    let listing = create_listing();

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let providers: Vec<ProviderProfile> = (0..*candidate_count)
            .map(|i| {
                let lat_offset = (i as f64 * 0.001) % 0.2;
                let lon_offset = (i as f64 * 0.0007) % 0.2;
                create_provider(i, 40.7128 + lat_offset, -74.0060 + lon_offset)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("rank_providers", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| matcher.rank_providers(black_box(&listing), black_box(providers.clone())));
            },
        );
    }

    group.finish();
}

fn bench_criteria_evaluation(c: &mut Criterion) {
    let filter = SearchFilter {
        skills: vec!["plumbing".to_string(), "welding".to_string()],
        location: Some("40.7128,-74.0060".to_string()),
        min_rating: Some(4.0),
        max_distance_km: Some(25.0),
        page: PageRequest::of(0, 20, Some("rating"), None),
    };
    let providers: Vec<ProviderProfile> = (0..1000)
        .map(|i| create_provider(i, 40.7128, -74.0060))
        .collect();

    c.bench_function("criteria_filter_1000_profiles", |b| {
        b.iter(|| {
            let criteria = ProviderCriteria::from_filter(black_box(&filter));
            let matched = providers.iter().filter(|p| criteria.matches(p)).count();
            black_box(matched)
        });
    });
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_cosine_similarity,
    bench_matching,
    bench_criteria_evaluation
);

criterion_main!(benches);
