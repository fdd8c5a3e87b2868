use async_trait::async_trait;
use thiserror::Error;
use crate::models::{GeoPoint, GeocodeResult, PlaceCandidate, PlaceDetails, Prediction};

/// Errors that can occur when talking to the places provider
///
/// "No matches" is not an error: searches return an empty result instead.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error status {status}: {message}")]
    Api { status: String, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Places API key is not configured")]
    MissingApiKey,
}

/// One nearby-search call
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    pub location: GeoPoint,
    pub radius_m: u32,
    pub keyword: Option<String>,
    pub types: Vec<String>,
}

/// One page of nearby-search results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NearbyPage {
    pub results: Vec<PlaceCandidate>,
    pub next_page_token: Option<String>,
}

/// Contract of the upstream places-search/detail/geocode provider
#[async_trait]
pub trait PlacesGateway: Send + Sync {
    async fn nearby_search(&self, request: &NearbyRequest) -> Result<NearbyPage, GatewayError>;

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, GatewayError>;

    /// `Ok(None)` when the address resolves to nothing
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, GatewayError>;

    async fn autocomplete(&self, input: &str, types: &str) -> Result<Vec<Prediction>, GatewayError>;

    /// Client-facing URL for a photo reference
    fn photo_url(&self, reference: &str, max_width: u32) -> String;
}
