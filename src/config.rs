use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use crate::models::MatchingRules;
use crate::services::{CircuitBreakerConfig, ResilienceConfig, RetryConfig};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub directory: DirectorySettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Listing service location and the resilience policy for both directories
#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    #[serde(default = "default_listing_service_url")]
    pub listing_service_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_error_rate_threshold")]
    pub error_rate_threshold: f64,
    #[serde(default = "default_open_duration_secs")]
    pub open_duration_secs: u64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            listing_service_url: default_listing_service_url(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            failure_threshold: default_failure_threshold(),
            error_rate_threshold: default_error_rate_threshold(),
            open_duration_secs: default_open_duration_secs(),
        }
    }
}

impl DirectorySettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn resilience(&self) -> ResilienceConfig {
        ResilienceConfig {
            timeout: self.request_timeout(),
            retry: RetryConfig {
                max_retries: self.max_retries,
                initial_backoff: Duration::from_millis(self.initial_backoff_ms),
                max_backoff: Duration::from_millis(self.max_backoff_ms),
                ..Default::default()
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: self.failure_threshold,
                error_rate_threshold: self.error_rate_threshold,
                open_duration: Duration::from_secs(self.open_duration_secs),
                ..Default::default()
            },
        }
    }
}

fn default_listing_service_url() -> String { "http://localhost:8081/api".to_string() }
fn default_request_timeout_ms() -> u64 { 2000 }
fn default_max_retries() -> u32 { 2 }
fn default_initial_backoff_ms() -> u64 { 100 }
fn default_max_backoff_ms() -> u64 { 2000 }
fn default_failure_threshold() -> u32 { 5 }
fn default_error_rate_threshold() -> f64 { 0.5 }
fn default_open_duration_secs() -> u64 { 30 }

/// Profile store settings; no URL means the in-memory store
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    pub redis_url: Option<String>,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_l1_cache_size")]
    pub l1_cache_size: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            redis_url: None,
            ttl_secs: default_ttl_secs(),
            l1_cache_size: default_l1_cache_size(),
        }
    }
}

fn default_cache_enabled() -> bool { true }
fn default_ttl_secs() -> u64 { 60 }
fn default_l1_cache_size() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_proximity_km")]
    pub proximity_km: f64,
    #[serde(default = "default_min_provider_rating")]
    pub min_provider_rating: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            proximity_km: default_proximity_km(),
            min_provider_rating: default_min_provider_rating(),
            max_results: default_max_results(),
        }
    }
}

impl MatchingSettings {
    pub fn rules(&self) -> MatchingRules {
        MatchingRules {
            proximity_km: self.proximity_km,
            min_provider_rating: self.min_provider_rating,
            max_results: self.max_results,
        }
    }
}

fn default_proximity_km() -> f64 { 10.0 }
fn default_min_provider_rating() -> f64 { 4.0 }
fn default_max_results() -> usize { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Later sources override earlier ones:
    /// 1. `config/default.toml`
    /// 2. `config/local.toml` (development overrides)
    /// 3. Environment variables prefixed with `SKILLMATCH__`
    /// 4. `DATABASE_URL`, `REDIS_URL` and `LISTING_SERVICE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SKILLMATCH__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        apply_url_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        apply_url_overrides(settings)?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("SKILLMATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Conventional connection-string variables win over everything else
fn apply_url_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("DATABASE_URL", "database.url"),
        ("REDIS_URL", "cache.redis_url"),
        ("LISTING_SERVICE_URL", "directory.listing_service_url"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            if !value.trim().is_empty() {
                builder = builder.set_override(key, value)?;
            }
        }
    }

    builder.build()
}
