use serde::{Deserialize, Serialize};
use crate::models::domain::{GeoPoint, Prediction, Review};

/// Photo as shown to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoView {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Cafe entry of a nearby-search response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CafeView {
    pub id: String,
    pub name: String,
    pub rating: f64,
    #[serde(rename = "reviewCount")]
    pub review_count: u32,
    #[serde(rename = "priceLevel")]
    pub price_level: Option<u8>,
    pub address: String,
    pub location: Option<GeoPoint>,
    pub distance: Option<f64>,
    #[serde(rename = "isOpen")]
    pub is_open: Option<bool>,
    pub photos: Vec<PhotoView>,
    pub types: Vec<String>,
    #[serde(rename = "businessStatus")]
    pub business_status: String,
    #[serde(rename = "relevanceScore")]
    pub relevance_score: i32,
    #[serde(rename = "isFallbackResult")]
    pub is_fallback_result: bool,
}

/// Response for the nearby-search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub success: bool,
    pub count: usize,
    #[serde(rename = "userLocation")]
    pub user_location: GeoPoint,
    pub radius: u32,
    #[serde(rename = "searchRadius")]
    pub search_radius: u32,
    pub fallback: bool,
    pub cafes: Vec<CafeView>,
}

/// Full cafe record of a details response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CafeDetailsView {
    pub id: String,
    pub name: String,
    pub rating: f64,
    #[serde(rename = "reviewCount")]
    pub review_count: u32,
    #[serde(rename = "priceLevel")]
    pub price_level: Option<u8>,
    pub address: String,
    pub location: Option<GeoPoint>,
    pub distance: Option<f64>,
    #[serde(rename = "isOpen")]
    pub is_open: Option<bool>,
    pub photos: Vec<PhotoView>,
    pub types: Vec<String>,
    #[serde(rename = "businessStatus")]
    pub business_status: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub reviews: Vec<Review>,
    #[serde(rename = "openingHours")]
    pub opening_hours: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsResponse {
    pub success: bool,
    pub cafe: CafeDetailsView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub success: bool,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "formattedAddress")]
    pub formatted_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    pub success: bool,
    pub predictions: Vec<Prediction>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cache: crate::services::CacheStats,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
