use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use skillmatch::config::{Settings, LoggingSettings};
use skillmatch::core::Matcher;
use skillmatch::routes::{self, AppState};
use skillmatch::services::{
    HttpListingSource, InMemoryProviderStore, ListingDirectory, MatchCache, MatchService,
    PostgresProviderStore, ProviderDirectory, ProviderSource, ProviderStore, ResilienceGuard,
    SearchService,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration comes first so the log level can be read from it
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        startup_error("Configuration error", e)
    })?;

    init_logging(&settings.logging);

    info!("Starting skillmatch service...");

    // Profile store: Postgres when configured, in-memory otherwise
    let (store, provider_source): (Arc<dyn ProviderStore>, Arc<dyn ProviderSource>) =
        match settings.database.url.as_deref().filter(|url| !url.trim().is_empty()) {
            Some(url) => {
                let db_max_conn = settings.database.max_connections.unwrap_or(10);
                let postgres = PostgresProviderStore::connect(
                    url,
                    db_max_conn,
                    settings.database.min_connections.unwrap_or(1),
                    Duration::from_secs(settings.database.acquire_timeout_secs.unwrap_or(5)),
                    Duration::from_secs(settings.database.idle_timeout_secs.unwrap_or(600)),
                )
                .await
                .map_err(|e| {
                    error!("Failed to connect to PostgreSQL: {}", e);
                    startup_error("PostgreSQL connection error", e)
                })?;

                info!("PostgreSQL profile store initialized (max: {} connections)", db_max_conn);
                let postgres = Arc::new(postgres);
                (postgres.clone() as Arc<dyn ProviderStore>, postgres as Arc<dyn ProviderSource>)
            }
            None => {
                warn!("No database URL configured, serving provider profiles from memory");
                let memory = Arc::new(InMemoryProviderStore::default());
                (memory.clone() as Arc<dyn ProviderStore>, memory as Arc<dyn ProviderSource>)
            }
        };

    // Directory collaborators, one breaker each
    let directory = &settings.directory;
    let listing_client = HttpListingSource::new(
        directory.listing_service_url.clone(),
        directory.request_timeout(),
    )
    .map_err(|e| startup_error("Listing client error", e))?;

    let listings = ListingDirectory::new(
        Arc::new(listing_client),
        ResilienceGuard::new("listing-service", directory.resilience()),
    );
    let providers = ProviderDirectory::new(
        provider_source,
        ResilienceGuard::new("provider-store", directory.resilience()),
    );

    info!("Listing service client targeting {}", directory.listing_service_url);

    let rules = settings.matching.rules();
    info!("Matcher initialized with rules: {:?}", rules);
    let mut match_service = MatchService::new(listings, providers, Matcher::new(rules));

    // Match cache (optional - results are recomputed without it)
    if settings.cache.enabled {
        let cache = &settings.cache;
        let match_cache = match cache.redis_url.as_deref() {
            Some(redis_url) => {
                match MatchCache::with_redis(redis_url, cache.l1_cache_size, cache.ttl_secs).await {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                        MatchCache::in_memory(cache.l1_cache_size, cache.ttl_secs)
                    }
                }
            }
            None => MatchCache::in_memory(cache.l1_cache_size, cache.ttl_secs),
        };

        info!(
            "Match cache initialized (L1: {} entries, TTL: {}s, Redis: {})",
            cache.l1_cache_size,
            cache.ttl_secs,
            match_cache.has_l2()
        );
        match_service = match_service.with_cache(Arc::new(match_cache));
    }

    let app_state = AppState {
        matches: match_service,
        search: SearchService::new(store),
        default_page_size: settings.search.default_page_size,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes::configure_extractors)
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
