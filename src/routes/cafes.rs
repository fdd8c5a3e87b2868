use actix_web::{web, HttpResponse, Responder};
use crate::core::{CafeFinder, FinderError};
use crate::models::{
    AutocompleteParams, DetailsParams, ErrorResponse, GeocodeParams, HealthResponse, NearbyParams,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub finder: CafeFinder,
}

/// Configure all cafe-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/nearby", web::get().to(nearby_cafes))
        .route("/details", web::get().to(cafe_details))
        .route("/geocode", web::get().to(geocode))
        .route("/autocomplete", web::get().to(autocomplete));
}

/// Map an engine error to its HTTP response
///
/// Upstream details are logged, never returned; clients get `upstream_message`.
fn error_response(err: FinderError, upstream_message: &str) -> HttpResponse {
    match err {
        FinderError::Validation(e) => {
            tracing::info!("Rejected request: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string()))
        }
        FinderError::NotFound(message) => HttpResponse::NotFound().json(ErrorResponse::new(message)),
        FinderError::Upstream(e) => {
            tracing::error!("Upstream failure: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(upstream_message))
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        cache: state.finder.cache().stats(),
    })
}

/// Nearby cafes endpoint
///
/// GET /api/nearby?lat=12.97&lng=77.59&radius=5000&sort=distance&minRating=0&maxPrice=4
async fn nearby_cafes(
    state: web::Data<AppState>,
    query: web::Query<NearbyParams>,
) -> impl Responder {
    match state.finder.nearby(&query).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(e, "Failed to search for cafes. Please try again."),
    }
}

/// Cafe details endpoint
///
/// GET /api/details?placeId={placeId}&lat=12.97&lng=77.59
async fn cafe_details(
    state: web::Data<AppState>,
    query: web::Query<DetailsParams>,
) -> impl Responder {
    match state.finder.details(&query).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(e, "Failed to fetch cafe details. Please try again."),
    }
}

/// Geocoding endpoint
///
/// GET /api/geocode?address={address}
async fn geocode(
    state: web::Data<AppState>,
    query: web::Query<GeocodeParams>,
) -> impl Responder {
    match state.finder.geocode(&query).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(e, "Failed to geocode address. Please try again."),
    }
}

/// Autocomplete endpoint
///
/// GET /api/autocomplete?input={text}&types=geocode
async fn autocomplete(
    state: web::Data<AppState>,
    query: web::Query<AutocompleteParams>,
) -> impl Responder {
    match state.finder.autocomplete(&query).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(e, "Failed to get suggestions. Please try again."),
    }
}
