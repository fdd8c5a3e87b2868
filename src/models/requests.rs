use serde::{Deserialize, Serialize};

// Query parameters arrive as raw strings so that parsing policy (defaults,
// range errors) stays with the validators instead of the extractor.

/// Query for `GET /api/nearby`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub sort: Option<String>,
    #[serde(rename = "minRating", alias = "min_rating")]
    pub min_rating: Option<String>,
    #[serde(rename = "maxPrice", alias = "max_price")]
    pub max_price: Option<String>,
}

/// Query for `GET /api/details`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailsParams {
    #[serde(rename = "placeId", alias = "place_id")]
    pub place_id: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// Query for `GET /api/geocode`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodeParams {
    pub address: Option<String>,
}

/// Query for `GET /api/autocomplete`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutocompleteParams {
    pub input: Option<String>,
    pub types: Option<String>,
}
