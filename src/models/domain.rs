use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors produced when parsing a `"lat,lng"` location string
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationParseError {
    #[error("expected \"lat,lng\", got {0:?}")]
    Format(String),

    #[error("invalid coordinate value: {0:?}")]
    Number(String),

    #[error("coordinates out of range: ({0}, {1})")]
    OutOfRange(f64, f64),
}

/// A latitude/longitude pair in degrees.
///
/// `(0.0, 0.0)` is reserved as the "unknown location" sentinel. Any distance
/// involving it is treated as infinitely far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const UNKNOWN: Coordinates = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_unknown(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Parse the combined `"lat,lng"` form used by upstream services
    pub fn parse(raw: &str) -> Result<Self, LocationParseError> {
        let mut parts = raw.split(',');
        let (lat, lng) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lat), Some(lng), None) => (lat.trim(), lng.trim()),
            _ => return Err(LocationParseError::Format(raw.to_string())),
        };

        let parse_part = |part: &str| -> Result<f64, LocationParseError> {
            part.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| LocationParseError::Number(part.to_string()))
        };

        let latitude = parse_part(lat)?;
        let longitude = parse_part(lng)?;
        Self::checked(latitude, longitude)
    }

    fn checked(latitude: f64, longitude: f64) -> Result<Self, LocationParseError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationParseError::OutOfRange(latitude, longitude));
        }
        Ok(Self { latitude, longitude })
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLocation {
    Text(String),
    Pair { latitude: f64, longitude: f64 },
}

// Records with an unreadable location still load; they just never pass a
// proximity filter.
impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed = match Option::<RawLocation>::deserialize(deserializer)? {
            None => return Ok(Self::UNKNOWN),
            Some(RawLocation::Text(raw)) => Self::parse(&raw),
            Some(RawLocation::Pair { latitude, longitude }) => Self::checked(latitude, longitude),
        };

        Ok(parsed.unwrap_or_else(|e| {
            tracing::warn!("Unreadable location, treating as unknown: {}", e);
            Self::UNKNOWN
        }))
    }
}

/// Service provider profile, owned by the profile store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfile {
    #[serde(default)]
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: Coordinates,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "isAvailable", default)]
    pub is_available: bool,
}

/// Lifecycle status of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListingStatus {
    #[default]
    Open,
    Assigned,
    Completed,
    Cancelled,
    Unavailable,
    /// Any status this service does not track
    #[serde(other)]
    Unknown,
}

/// Job listing, owned by the listing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: Coordinates,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub status: ListingStatus,
    #[serde(rename = "clientId", default)]
    pub client_id: Option<i64>,
    #[serde(rename = "technicianId", default)]
    pub technician_id: Option<i64>,
}

/// The record a match result points at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MatchCandidate {
    Provider(ProviderProfile),
    Listing(Listing),
}

impl MatchCandidate {
    /// Identity used as the final ranking tie-breaker
    pub fn identity(&self) -> i64 {
        match self {
            MatchCandidate::Provider(p) => p.user_id,
            MatchCandidate::Listing(l) => l.id.unwrap_or(i64::MAX),
        }
    }
}

/// Scored match, built per request and never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate: MatchCandidate,
    #[serde(rename = "similarityScore")]
    pub similarity_score: f64,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    pub rating: f64,
    #[serde(rename = "skillsMatchCount")]
    pub skills_match_count: usize,
}

/// Thresholds applied by the ranking pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingRules {
    pub proximity_km: f64,
    pub min_provider_rating: f64,
    pub max_results: usize,
}

impl Default for MatchingRules {
    fn default() -> Self {
        Self {
            proximity_km: 10.0,
            min_provider_rating: 4.0,
            max_results: 5,
        }
    }
}
