// Service exports
pub mod cache;
pub mod google;
pub mod places;

pub use cache::{ResultCache, CacheKey, CacheError, CacheStats};
pub use google::GooglePlacesClient;
pub use places::{PlacesGateway, GatewayError, NearbyRequest, NearbyPage};
