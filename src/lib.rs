//! CaffyRute - nearby cafe discovery service
//!
//! This library provides the cafe discovery engine: input validation, distance
//! computation, relevance scoring, the fallback search cascade, and the
//! best-effort result cache that sits in front of the Google Places API.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{CafeFinder, FallbackSearch, FinderError, distance::distance_km, scoring::relevance_score};
pub use models::{PlaceCandidate, ScoredCafe, SearchQuery, SearchOutcome, SearchSettings, SortKey};
pub use services::{PlacesGateway, GooglePlacesClient, ResultCache};
