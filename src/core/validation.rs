use thiserror::Error;
use validator::Validate;
use crate::models::GeoPoint;

pub const DEFAULT_RADIUS_M: u32 = 5000;
pub const MIN_RADIUS_M: i64 = 100;
pub const MAX_RADIUS_M: i64 = 50_000;
pub const MAX_PRICE_LEVEL: u8 = 4;
pub const MAX_TEXT_LEN: usize = 500;

/// Errors reported for bad, missing or out-of-range input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Latitude and longitude must be numbers")]
    CoordinatesNotNumeric,

    #[error("Latitude must be between -90 and 90")]
    LatitudeOutOfRange,

    #[error("Longitude must be between -180 and 180")]
    LongitudeOutOfRange,

    #[error("Radius must be at least 100 meters")]
    RadiusTooSmall,

    #[error("Radius cannot exceed 50000 meters (50 km)")]
    RadiusTooLarge,

    #[error("Minimum rating must be between 0 and 5")]
    InvalidMinRating,

    #[error("Maximum price level must be between 0 and 4")]
    InvalidPriceLevel,

    #[error("Place ID is required")]
    MissingPlaceId,

    #[error("Invalid Place ID format")]
    InvalidPlaceId,

    #[error("{field} is required (at least 2 characters)")]
    TextTooShort { field: &'static str },
}

impl ValidationError {
    /// True for every coordinate failure
    pub fn is_invalid_coordinates(&self) -> bool {
        matches!(
            self,
            ValidationError::CoordinatesNotNumeric
                | ValidationError::LatitudeOutOfRange
                | ValidationError::LongitudeOutOfRange
        )
    }
}

/// Parse and bounds-check a coordinate pair
pub fn validate_coordinates(lat: Option<&str>, lng: Option<&str>) -> Result<GeoPoint, ValidationError> {
    let lat = parse_float(lat).ok_or(ValidationError::CoordinatesNotNumeric)?;
    let lng = parse_float(lng).ok_or(ValidationError::CoordinatesNotNumeric)?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(ValidationError::LatitudeOutOfRange);
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(ValidationError::LongitudeOutOfRange);
    }

    Ok(GeoPoint::new(lat, lng))
}

/// Parse the search radius in meters
///
/// Missing or unparseable input yields the 5 km default; parseable values
/// outside [100, 50000] are rejected rather than clamped.
pub fn validate_radius(raw: Option<&str>) -> Result<u32, ValidationError> {
    let radius = match parse_int(raw) {
        Some(r) => r,
        None => return Ok(DEFAULT_RADIUS_M),
    };

    if radius < MIN_RADIUS_M {
        return Err(ValidationError::RadiusTooSmall);
    }
    if radius > MAX_RADIUS_M {
        return Err(ValidationError::RadiusTooLarge);
    }

    Ok(radius as u32)
}

pub fn validate_min_rating(raw: Option<&str>) -> Result<f64, ValidationError> {
    match parse_float(raw) {
        None => Ok(0.0),
        Some(r) if (0.0..=5.0).contains(&r) => Ok(r),
        Some(_) => Err(ValidationError::InvalidMinRating),
    }
}

pub fn validate_max_price(raw: Option<&str>) -> Result<u8, ValidationError> {
    match parse_int(raw) {
        None => Ok(MAX_PRICE_LEVEL),
        Some(p) if (0..=MAX_PRICE_LEVEL as i64).contains(&p) => Ok(p as u8),
        Some(_) => Err(ValidationError::InvalidPriceLevel),
    }
}

/// Check an upstream place identifier: `[A-Za-z0-9_-]+`
pub fn validate_place_id(raw: Option<&str>) -> Result<&str, ValidationError> {
    let place_id = match raw {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ValidationError::MissingPlaceId),
    };

    let well_formed = place_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !well_formed {
        return Err(ValidationError::InvalidPlaceId);
    }

    Ok(place_id)
}

/// Strip angle brackets, trim, and cap at 500 characters. Never fails.
pub fn sanitize_text(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let stripped: String = raw.chars().filter(|c| *c != '<' && *c != '>').collect();
    stripped.trim().chars().take(MAX_TEXT_LEN).collect()
}

#[derive(Debug, Validate)]
struct SearchText {
    #[validate(length(min = 2))]
    value: String,
}

/// Sanitize free text and require at least two characters of it
pub fn validate_search_text(raw: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    let text = SearchText { value: sanitize_text(raw) };
    text.validate()
        .map_err(|_| ValidationError::TextTooShort { field })?;
    Ok(text.value)
}

/// Leading numeric part of `s`, ignoring whatever text follows it
///
/// `allow_fraction` admits a decimal point and exponent; without it only an
/// optionally signed run of digits is taken.
fn numeric_prefix(s: &str, allow_fraction: bool) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        end
    };

    let sign = usize::from(matches!(bytes.first(), Some(b'+') | Some(b'-')));
    let mut end = digits_from(sign);
    let mut has_digits = end > sign;

    if allow_fraction && bytes.get(end) == Some(&b'.') {
        let fraction_end = digits_from(end + 1);
        if has_digits || fraction_end > end + 1 {
            end = fraction_end;
            has_digits = true;
        }
    }

    if !has_digits {
        return "";
    }

    if allow_fraction && matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let exp_sign = end + 1 + usize::from(matches!(bytes.get(end + 1), Some(b'+') | Some(b'-')));
        let exp_end = digits_from(exp_sign);
        if exp_end > exp_sign {
            end = exp_end;
        }
    }

    &s[..end]
}

fn parse_float(raw: Option<&str>) -> Option<f64> {
    let prefix = numeric_prefix(raw?.trim(), true);
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer parse of the leading digits; decimals are cut at the point
fn parse_int(raw: Option<&str>) -> Option<i64> {
    numeric_prefix(raw?.trim(), false).parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_accepted_at_bounds() {
        assert!(validate_coordinates(Some("90"), Some("180")).is_ok());
        assert!(validate_coordinates(Some("-90"), Some("-180")).is_ok());
        let point = validate_coordinates(Some(" 12.97 "), Some("77.59")).unwrap();
        assert_eq!(point, GeoPoint::new(12.97, 77.59));
    }

    #[test]
    fn test_coordinates_rejected() {
        assert_eq!(
            validate_coordinates(Some("90.01"), Some("0")),
            Err(ValidationError::LatitudeOutOfRange)
        );
        assert_eq!(
            validate_coordinates(Some("0"), Some("-180.5")),
            Err(ValidationError::LongitudeOutOfRange)
        );
        assert_eq!(
            validate_coordinates(Some("abc"), Some("0")),
            Err(ValidationError::CoordinatesNotNumeric)
        );
        assert!(validate_coordinates(None, Some("0")).unwrap_err().is_invalid_coordinates());
        assert!(validate_coordinates(Some("NaN"), Some("0")).is_err());
        assert!(validate_coordinates(Some("inf"), Some("0")).is_err());
    }

    #[test]
    fn test_radius_defaults_when_unparseable() {
        assert_eq!(validate_radius(None), Ok(5000));
        assert_eq!(validate_radius(Some("far")), Ok(5000));
        assert_eq!(validate_radius(Some("")), Ok(5000));
    }

    #[test]
    fn test_radius_bounds() {
        assert_eq!(validate_radius(Some("100")), Ok(100));
        assert_eq!(validate_radius(Some("50000")), Ok(50_000));
        assert_eq!(validate_radius(Some("2500.9")), Ok(2500));
        assert_eq!(validate_radius(Some("99")), Err(ValidationError::RadiusTooSmall));
        assert_eq!(validate_radius(Some("50001")), Err(ValidationError::RadiusTooLarge));
        assert_eq!(validate_radius(Some("-5")), Err(ValidationError::RadiusTooSmall));
    }

    #[test]
    fn test_numbers_with_trailing_text() {
        let point = validate_coordinates(Some("12.97abc"), Some("77.59,")).unwrap();
        assert_eq!(point, GeoPoint::new(12.97, 77.59));
        assert_eq!(validate_radius(Some("100000m")), Err(ValidationError::RadiusTooLarge));
        assert_eq!(validate_radius(Some("1500 meters")), Ok(1500));
        assert_eq!(validate_radius(Some("1e5")), Err(ValidationError::RadiusTooSmall));
        assert_eq!(validate_min_rating(Some("4.5stars")), Ok(4.5));
        assert_eq!(validate_max_price(Some("2$")), Ok(2));
        assert_eq!(validate_coordinates(Some("-.5"), Some("+1e1")), Ok(GeoPoint::new(-0.5, 10.0)));
        assert_eq!(
            validate_coordinates(Some("-"), Some("0")),
            Err(ValidationError::CoordinatesNotNumeric)
        );
    }

    #[test]
    fn test_rating_and_price() {
        assert_eq!(validate_min_rating(None), Ok(0.0));
        assert_eq!(validate_min_rating(Some("4.2")), Ok(4.2));
        assert_eq!(validate_min_rating(Some("6")), Err(ValidationError::InvalidMinRating));
        assert_eq!(validate_max_price(Some("x")), Ok(4));
        assert_eq!(validate_max_price(Some("0")), Ok(0));
        assert_eq!(validate_max_price(Some("5")), Err(ValidationError::InvalidPriceLevel));
    }

    #[test]
    fn test_place_id() {
        assert_eq!(validate_place_id(Some("ChIJ_abc-123")), Ok("ChIJ_abc-123"));
        assert_eq!(validate_place_id(None), Err(ValidationError::MissingPlaceId));
        assert_eq!(validate_place_id(Some("")), Err(ValidationError::MissingPlaceId));
        assert_eq!(validate_place_id(Some("abc def")), Err(ValidationError::InvalidPlaceId));
        assert_eq!(validate_place_id(Some("<script>")), Err(ValidationError::InvalidPlaceId));
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text(Some("  <b>Koramangala</b> ")), "bKoramangala/b");
        assert_eq!(sanitize_text(None), "");
        assert_eq!(sanitize_text(Some(&"a".repeat(600))).chars().count(), 500);
    }

    #[test]
    fn test_search_text_minimum_length() {
        assert_eq!(validate_search_text(Some(" Indiranagar "), "Address"), Ok("Indiranagar".to_string()));
        assert_eq!(
            validate_search_text(Some("<a>"), "Input"),
            Err(ValidationError::TextTooShort { field: "Input" })
        );
    }
}
