use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{ErrorResponse, SearchListingsQuery, SearchProvidersQuery};
use crate::routes::{validation_failed, AppState};

/// Configure search routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/search/providers", web::get().to(search_providers))
        .route("/search/listings", web::get().to(search_listings));
}

/// Paged provider search
///
/// GET /search/providers?skills=a,b&skills=c&location=lat,lng&minRating=&maxDistance=&page=&size=&sortBy=&sortDir=
async fn search_providers(
    state: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> impl Responder {
    let filter = SearchProvidersQuery::from_pairs(query.into_inner()).into_filter(state.default_page_size);

    match state.search.search_providers(&filter).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => {
            tracing::error!("Provider search failed: {}", e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "Profile store unavailable".to_string(),
                message: e.to_string(),
                status_code: 503,
            })
        }
    }
}

/// Paged listing search (always empty for now)
///
/// GET /search/listings?title=&skills=&location=&minBudget=&maxBudget=&page=&size=&sortBy=&sortDir=
async fn search_listings(
    state: web::Data<AppState>,
    query: web::Query<SearchListingsQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for listing search: {:?}", errors);
        return validation_failed(errors);
    }

    let filter = query.into_inner().into_filter(state.default_page_size);

    HttpResponse::Ok().json(state.search.search_listings(&filter).await)
}
