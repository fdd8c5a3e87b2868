// Core engine exports
pub mod distance;
pub mod filters;
pub mod finder;
pub mod scoring;
pub mod search;
pub mod validation;

pub use distance::{haversine_distance, distance_km, distance_between};
pub use filters::{assemble, sort_cafes, format_cafe};
pub use finder::{CafeFinder, CacheTtls, FinderError};
pub use scoring::{relevance_score, is_relevant};
pub use search::FallbackSearch;
pub use validation::{
    validate_coordinates, validate_radius, validate_place_id, sanitize_text, ValidationError,
};
