use std::cmp::Ordering;
use crate::models::{CafeView, PhotoView, ScoredCafe, SearchQuery, SortKey};
use crate::services::PlacesGateway;

/// Price level assumed for cafes without one when sorting by price
const DEFAULT_PRICE_LEVEL: u8 = 2;

/// Photos kept per cafe in list responses, and their width
pub const LIST_PHOTO_LIMIT: usize = 3;
pub const LIST_PHOTO_WIDTH: u32 = 400;

/// Hard distance cut-off; unknown distance never counts as near
#[inline]
pub fn within_distance(cafe: &ScoredCafe, max_distance_km: f64) -> bool {
    matches!(cafe.distance_km, Some(d) if d <= max_distance_km)
}

/// Rating floor, only applied when positive
#[inline]
pub fn meets_rating(cafe: &ScoredCafe, min_rating: f64) -> bool {
    min_rating <= 0.0 || cafe.place.rating >= min_rating
}

/// Price ceiling; cafes without a price level always pass
#[inline]
pub fn within_price(cafe: &ScoredCafe, max_price_level: u8) -> bool {
    if max_price_level >= 4 {
        return true;
    }
    match cafe.place.price_level {
        Some(level) => level <= max_price_level,
        None => true,
    }
}

/// Sort in place; the sort is stable so ties keep upstream order
pub fn sort_cafes(cafes: &mut [ScoredCafe], sort_key: SortKey) {
    match sort_key {
        SortKey::Distance => cafes.sort_by(|a, b| match (a.distance_km, b.distance_km) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortKey::Rating => cafes.sort_by(|a, b| {
            b.place
                .rating
                .partial_cmp(&a.place.rating)
                .unwrap_or(Ordering::Equal)
        }),
        SortKey::Price => cafes.sort_by_key(|c| c.place.price_level.unwrap_or(DEFAULT_PRICE_LEVEL)),
        SortKey::Reviews => cafes.sort_by(|a, b| b.place.review_count.cmp(&a.place.review_count)),
    }
}

/// Apply the request's filters and ordering to a scored result set
///
/// # Arguments
/// * `cafes` - Scored candidates from the search cascade
/// * `query` - The validated request
/// * `max_distance_km` - Distance cut-off, normally the requested radius
pub fn assemble(cafes: Vec<ScoredCafe>, query: &SearchQuery, max_distance_km: f64) -> Vec<ScoredCafe> {
    let mut kept: Vec<ScoredCafe> = cafes
        .into_iter()
        .filter(|cafe| within_distance(cafe, max_distance_km))
        .filter(|cafe| meets_rating(cafe, query.min_rating))
        .filter(|cafe| within_price(cafe, query.max_price_level))
        .collect();

    sort_cafes(&mut kept, query.sort_key);
    kept
}

/// Shape a scored cafe into its client representation
pub fn format_cafe(cafe: ScoredCafe, gateway: &dyn PlacesGateway) -> CafeView {
    let place = cafe.place;

    let photos = place
        .photos
        .iter()
        .take(LIST_PHOTO_LIMIT)
        .map(|photo| PhotoView {
            url: gateway.photo_url(&photo.reference, LIST_PHOTO_WIDTH),
            width: photo.width,
            height: photo.height,
        })
        .collect();

    CafeView {
        id: place.id,
        name: place.name,
        rating: place.rating,
        review_count: place.review_count,
        price_level: place.price_level,
        address: place.address,
        location: place.location,
        distance: cafe.distance_km,
        is_open: place.is_open,
        photos,
        types: place.types,
        business_status: place.business_status,
        relevance_score: cafe.relevance_score,
        is_fallback_result: cafe.is_fallback_result,
    }
}
