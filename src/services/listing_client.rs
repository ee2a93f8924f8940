use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use crate::models::Listing;
use crate::services::directory::{DirectoryError, ListingSource};

/// HTTP client for the listing service
///
/// Handles:
/// - Fetching a single listing by ID
/// - Fetching all open listings
pub struct HttpListingSource {
    base_url: String,
    client: Client,
}

impl HttpListingSource {
    /// Create a new listing service client
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json(&self, url: &str) -> Result<Value, DirectoryError> {
        tracing::debug!("Fetching from listing service: {}", url);

        let response = self.client.get(url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(DirectoryError::NotFound(url.to_string())),
            status => {
                let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!("Listing service error for {}: {} - {}", url, status, body);
                Err(DirectoryError::Upstream(status.as_u16()))
            }
        }
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn get_listing(&self, listing_id: i64) -> Result<Listing, DirectoryError> {
        let json = self.get_json(&self.url(&format!("gigs/{}", listing_id))).await?;

        let mut listing: Listing = serde_json::from_value(json)
            .map_err(|e| DirectoryError::InvalidResponse(format!("Failed to parse listing: {}", e)))?;

        if listing.id.is_none() {
            listing.id = Some(listing_id);
        }

        Ok(listing)
    }

    async fn list_open_listings(&self) -> Result<Vec<Listing>, DirectoryError> {
        let json = self.get_json(&self.url("gigs/open")).await?;

        // Either a bare array or a page envelope with a `content` array
        let documents = match &json {
            Value::Array(items) => items,
            other => other
                .get("content")
                .and_then(|c| c.as_array())
                .ok_or_else(|| DirectoryError::InvalidResponse("Missing listings array".into()))?,
        };

        let listings: Vec<Listing> = documents
            .iter()
            .filter_map(|doc| match serde_json::from_value(doc.clone()) {
                Ok(listing) => Some(listing),
                Err(e) => {
                    tracing::warn!("Skipping unreadable listing: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} open listings", listings.len());

        Ok(listings)
    }
}
