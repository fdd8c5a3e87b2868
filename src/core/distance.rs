use crate::models::GeoPoint;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance reported for identical coordinates, so "nearest" never reads as zero
pub const SAME_LOCATION_KM: f64 = 0.01;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lng1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lng2` - Longitude of second point in degrees
///
/// # Returns
/// Unrounded distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Display distance between two coordinates, rounded to 2 decimal places
///
/// Returns `None` when any input is not a finite number or the computed value
/// is unusable; callers treat that as "unknown distance". Identical points
/// yield [`SAME_LOCATION_KM`].
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> Option<f64> {
    if ![lat1, lng1, lat2, lng2].iter().all(|v| v.is_finite()) {
        return None;
    }

    if lat1 == lat2 && lng1 == lng2 {
        return Some(SAME_LOCATION_KM);
    }

    let distance = haversine_distance(lat1, lng1, lat2, lng2);
    if !distance.is_finite() || distance < 0.0 {
        return None;
    }

    Some((distance * 100.0).round() / 100.0)
}

/// [`distance_km`] over optional points; a missing side means unknown distance
#[inline]
pub fn distance_between(from: Option<GeoPoint>, to: Option<GeoPoint>) -> Option<f64> {
    match (from, to) {
        (Some(a), Some(b)) => distance_km(a.lat, a.lng, b.lat, b.lng),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris (approximately 344 km)
        let distance = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_identical_points_use_sentinel() {
        assert_eq!(distance_km(12.97, 77.59, 12.97, 77.59), Some(0.01));
    }

    #[test]
    fn test_rounded_to_two_decimals() {
        let d = distance_km(12.9716, 77.5946, 12.9352, 77.6245).unwrap();
        assert_eq!(d, (d * 100.0).round() / 100.0);
        assert!(d > 4.0 && d < 6.0, "Expected ~5km, got {}", d);
    }

    #[test]
    fn test_non_finite_input_is_unknown() {
        assert_eq!(distance_km(f64::NAN, 77.59, 12.97, 77.59), None);
        assert_eq!(distance_km(12.97, f64::INFINITY, 12.97, 77.59), None);
    }

    #[test]
    fn test_distance_between_missing_point() {
        let here = GeoPoint::new(12.97, 77.59);
        assert_eq!(distance_between(Some(here), None), None);
        assert_eq!(distance_between(Some(here), Some(here)), Some(0.01));
    }
}
