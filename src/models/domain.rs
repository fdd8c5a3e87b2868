use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Upstream photo handle; resolved to a URL only when a response is shaped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub reference: String,
    pub width: u32,
    pub height: u32,
}

/// A place returned by the upstream search, not yet scored or filtered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "reviewCount", default)]
    pub review_count: u32,
    #[serde(rename = "priceLevel", default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
    #[serde(rename = "businessStatus", default = "default_business_status")]
    pub business_status: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "isOpen", default)]
    pub is_open: Option<bool>,
}

impl PlaceCandidate {
    pub fn has_type(&self, place_type: &str) -> bool {
        self.types.iter().any(|t| t == place_type)
    }
}

pub(crate) fn default_business_status() -> String {
    "OPERATIONAL".to_string()
}

/// Candidate annotated with its relevance score and distance from the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCafe {
    pub place: PlaceCandidate,
    pub relevance_score: i32,
    pub distance_km: Option<f64>,
    pub is_fallback_result: bool,
}

/// Place details: the candidate plus the fields only the detail lookup returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub place: PlaceCandidate,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub reviews: Vec<Review>,
    pub opening_hours: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub rating: f64,
    pub text: String,
    pub time: String,
    #[serde(rename = "profilePhoto")]
    pub profile_photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "formattedAddress")]
    pub formatted_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "placeId")]
    pub place_id: String,
    pub description: String,
    #[serde(rename = "mainText")]
    pub main_text: String,
    #[serde(rename = "secondaryText")]
    pub secondary_text: String,
}

/// Result ordering requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Distance,
    Rating,
    Price,
    Reviews,
}

impl SortKey {
    /// Unknown or missing values fall back to distance ordering
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("rating") => SortKey::Rating,
            Some("price") => SortKey::Price,
            Some("reviews") => SortKey::Reviews,
            _ => SortKey::Distance,
        }
    }
}

/// Validated nearby-search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub location: GeoPoint,
    pub radius_meters: u32,
    pub sort_key: SortKey,
    pub min_rating: f64,
    pub max_price_level: u8,
}

impl SearchQuery {
    pub fn radius_km(&self) -> f64 {
        self.radius_meters as f64 / 1000.0
    }
}

/// Which tier of the fallback cascade produced a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchTier {
    Primary,
    AlternativeTerms,
    RadiusExpansion,
    BasicEstablishments,
    Empty,
}

/// Output of the fallback cascade, before per-request filtering and sorting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub cafes: Vec<ScoredCafe>,
    pub tier: SearchTier,
    pub search_radius_m: u32,
    pub attempts: u32,
}

impl SearchOutcome {
    pub fn is_fallback(&self) -> bool {
        self.tier == SearchTier::BasicEstablishments
    }
}

/// Search tuning knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    pub radius_cap_m: u32,
    pub growth_factor: f64,
    pub max_attempts: u32,
    pub fallback_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            radius_cap_m: 20_000,
            growth_factor: 2.0,
            max_attempts: 12,
            fallback_limit: 15,
        }
    }
}
