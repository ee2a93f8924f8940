use actix_web::{web, HttpResponse, Responder};
use crate::models::HealthResponse;
use crate::routes::AppState;
use crate::services::CircuitState;

/// Configure health and match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/match/provider/{provider_id}", web::get().to(matches_for_provider))
        .route("/match/{listing_id}", web::get().to(matches_for_listing));
}

/// Health check endpoint
///
/// Degraded when the profile store is down or a collaborator circuit is not closed.
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.search.health_check().await;
    let circuits = state.matches.circuits();
    let circuits_closed = circuits.iter().all(|c| c.state == CircuitState::Closed.as_str());

    let status = if store_healthy && circuits_closed { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        circuits,
    })
}

/// Best providers for a listing
///
/// GET /match/{listingId}
///
/// Always 200; an unknown listing or an unreachable listing service gives `[]`.
async fn matches_for_listing(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> impl Responder {
    let listing_id = path.into_inner();
    tracing::info!("Finding matches for listing: {}", listing_id);

    let matches = state.matches.find_matches_for_listing(listing_id).await;

    HttpResponse::Ok().json(matches)
}

/// Best open listings for a provider
///
/// GET /match/provider/{providerId}
async fn matches_for_provider(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> impl Responder {
    let provider_id = path.into_inner();
    tracing::info!("Finding matches for provider: {}", provider_id);

    let matches = state.matches.find_matches_for_provider(provider_id).await;

    HttpResponse::Ok().json(matches)
}
