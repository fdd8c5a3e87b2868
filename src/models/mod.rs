// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    GeoPoint, PhotoRef, PlaceCandidate, PlaceDetails, Review, GeocodeResult, Prediction,
    ScoredCafe, SortKey, SearchQuery, SearchTier, SearchOutcome, SearchSettings,
};
pub use requests::{NearbyParams, DetailsParams, GeocodeParams, AutocompleteParams};
pub use responses::{
    PhotoView, CafeView, NearbyResponse, CafeDetailsView, DetailsResponse, GeocodeResponse,
    AutocompleteResponse, HealthResponse, ErrorResponse,
};
