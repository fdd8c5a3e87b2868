use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use crate::core::{
    distance::distance_between,
    filters::{assemble, format_cafe},
    search::FallbackSearch,
    validation::{
        validate_coordinates, validate_max_price, validate_min_rating, validate_place_id,
        validate_radius, validate_search_text, sanitize_text, ValidationError,
    },
};
use crate::models::{
    AutocompleteParams, AutocompleteResponse, CafeDetailsView, DetailsParams, DetailsResponse,
    GeoPoint, GeocodeParams, GeocodeResponse, NearbyParams, NearbyResponse, PhotoView,
    PlaceDetails, SearchOutcome, SearchQuery, SortKey,
};
use crate::services::{cache::ttl, CacheKey, GatewayError, PlacesGateway, ResultCache};

/// Photo width used in the details view
const DETAIL_PHOTO_WIDTH: u32 = 800;
const DEFAULT_AUTOCOMPLETE_TYPES: &str = "geocode";

/// Errors returned by the engine, one per response class
#[derive(Debug, Error)]
pub enum FinderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream failure: {0}")]
    Upstream(#[from] GatewayError),
}

/// Time-to-live per kind of cached answer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheTtls {
    pub nearby: Duration,
    pub details: Duration,
    pub geocode: Duration,
    pub autocomplete: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            nearby: ttl::NEARBY,
            details: ttl::DETAILS,
            geocode: ttl::GEOCODE,
            autocomplete: ttl::AUTOCOMPLETE,
        }
    }
}

/// Cafe discovery engine
///
/// Validates requests, serves repeated lookups from the result cache and
/// otherwise drives the places gateway. Cheap to clone; all clones share one
/// gateway and one cache.
#[derive(Clone)]
pub struct CafeFinder {
    gateway: Arc<dyn PlacesGateway>,
    cache: Arc<ResultCache>,
    search: FallbackSearch,
    ttls: CacheTtls,
}

impl CafeFinder {
    pub fn new(
        gateway: Arc<dyn PlacesGateway>,
        cache: Arc<ResultCache>,
        search: FallbackSearch,
        ttls: CacheTtls,
    ) -> Self {
        Self {
            gateway,
            cache,
            search,
            ttls,
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Parse and validate raw nearby-search parameters
    pub fn parse_query(params: &NearbyParams) -> Result<SearchQuery, ValidationError> {
        let location = validate_coordinates(params.lat.as_deref(), params.lng.as_deref())?;
        let radius_meters = validate_radius(params.radius.as_deref())?;
        let min_rating = validate_min_rating(params.min_rating.as_deref())?;
        let max_price_level = validate_max_price(params.max_price.as_deref())?;

        Ok(SearchQuery {
            location,
            radius_meters,
            sort_key: SortKey::parse(params.sort.as_deref()),
            min_rating,
            max_price_level,
        })
    }

    /// Find cafes near a location
    ///
    /// The cascade outcome is cached per rounded location and radius; distances,
    /// filters and ordering are applied per request on top of it.
    pub async fn nearby(&self, params: &NearbyParams) -> Result<NearbyResponse, FinderError> {
        let query = Self::parse_query(params)?;
        let cache_key = CacheKey::nearby(query.location.lat, query.location.lng, query.radius_meters);

        let outcome = match self.cache.get::<SearchOutcome>(&cache_key) {
            Some(outcome) => {
                tracing::debug!("Serving nearby search from cache: {}", cache_key);
                outcome
            }
            None => {
                let outcome = self
                    .search
                    .run(self.gateway.as_ref(), query.location, query.radius_meters)
                    .await?;
                self.cache.set(&cache_key, &outcome, self.ttls.nearby);
                outcome
            }
        };

        // Results found by widening the search are kept even beyond the
        // requested radius; otherwise the request radius is the hard limit.
        let max_distance_km = query.radius_km().max(outcome.search_radius_m as f64 / 1000.0);
        let fallback = outcome.is_fallback();
        let search_radius = outcome.search_radius_m;

        // A cached outcome may come from a nearby caller sharing the key
        let measured: Vec<_> = outcome
            .cafes
            .into_iter()
            .map(|mut cafe| {
                cafe.distance_km = distance_between(Some(query.location), cafe.place.location);
                cafe
            })
            .collect();

        let cafes: Vec<_> = assemble(measured, &query, max_distance_km)
            .into_iter()
            .map(|cafe| format_cafe(cafe, self.gateway.as_ref()))
            .collect();

        tracing::info!(
            "Returning {} cafes near ({}, {}) within {}m",
            cafes.len(),
            query.location.lat,
            query.location.lng,
            query.radius_meters
        );

        Ok(NearbyResponse {
            success: true,
            count: cafes.len(),
            user_location: query.location,
            radius: query.radius_meters,
            search_radius,
            fallback,
            cafes,
        })
    }

    /// Full details for one place, with distance from an optional user location
    ///
    /// An unusable user location is ignored rather than rejected.
    pub async fn details(&self, params: &DetailsParams) -> Result<DetailsResponse, FinderError> {
        let place_id = validate_place_id(params.place_id.as_deref())?;

        let user_location = match (params.lat.as_deref(), params.lng.as_deref()) {
            (Some(lat), Some(lng)) if !lat.is_empty() && !lng.is_empty() => {
                validate_coordinates(Some(lat), Some(lng)).ok()
            }
            _ => None,
        };

        let cache_key = CacheKey::details(place_id);
        let details = match self.cache.get::<PlaceDetails>(&cache_key) {
            Some(details) => details,
            None => {
                let details = self.gateway.place_details(place_id).await?;
                self.cache.set(&cache_key, &details, self.ttls.details);
                details
            }
        };

        Ok(DetailsResponse {
            success: true,
            cafe: self.format_details(details, user_location),
        })
    }

    /// Resolve an address to coordinates
    pub async fn geocode(&self, params: &GeocodeParams) -> Result<GeocodeResponse, FinderError> {
        let address = validate_search_text(params.address.as_deref(), "Address")?;

        let cache_key = CacheKey::geocode(&address);
        if let Some(cached) = self.cache.get::<GeocodeResponse>(&cache_key) {
            return Ok(cached);
        }

        let result = self
            .gateway
            .geocode(&address)
            .await?
            .ok_or_else(|| FinderError::NotFound("No location found for the given address".to_string()))?;

        let response = GeocodeResponse {
            success: true,
            lat: result.lat,
            lng: result.lng,
            formatted_address: result.formatted_address,
        };
        self.cache.set(&cache_key, &response, self.ttls.geocode);

        Ok(response)
    }

    /// Location suggestions for partially typed input
    pub async fn autocomplete(&self, params: &AutocompleteParams) -> Result<AutocompleteResponse, FinderError> {
        let input = validate_search_text(params.input.as_deref(), "Input")?;
        let types = match sanitize_text(params.types.as_deref()) {
            t if t.is_empty() => DEFAULT_AUTOCOMPLETE_TYPES.to_string(),
            t => t,
        };

        let cache_key = CacheKey::autocomplete(&input, &types);
        if let Some(cached) = self.cache.get::<AutocompleteResponse>(&cache_key) {
            return Ok(cached);
        }

        let predictions = self.gateway.autocomplete(&input, &types).await?;
        let response = AutocompleteResponse {
            success: true,
            predictions,
        };
        self.cache.set(&cache_key, &response, self.ttls.autocomplete);

        Ok(response)
    }

    fn format_details(&self, details: PlaceDetails, user_location: Option<GeoPoint>) -> CafeDetailsView {
        let place = details.place;
        let distance = distance_between(user_location, place.location);

        let photos = place
            .photos
            .iter()
            .map(|photo| PhotoView {
                url: self.gateway.photo_url(&photo.reference, DETAIL_PHOTO_WIDTH),
                width: photo.width,
                height: photo.height,
            })
            .collect();

        CafeDetailsView {
            id: place.id,
            name: place.name,
            rating: place.rating,
            review_count: place.review_count,
            price_level: place.price_level,
            address: place.address,
            location: place.location,
            distance,
            is_open: place.is_open,
            photos,
            types: place.types,
            business_status: place.business_status,
            website: details.website,
            phone: details.phone,
            reviews: details.reviews,
            opening_hours: details.opening_hours,
        }
    }
}
