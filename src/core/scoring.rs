use crate::models::PlaceCandidate;

/// Type adjustments; every listed type present on a candidate applies once
const TYPE_WEIGHTS: &[(&str, i32)] = &[
    ("cafe", 15),
    ("coffee_shop", 15),
    ("bakery", 10),
    ("restaurant", 5),
    ("gas_station", -20),
    ("lodging", -15),
    ("car_repair", -20),
];

const CAFE_KEYWORDS: &[&str] = &[
    "cafe", "café", "coffee", "espresso", "brew", "roast", "latte", "cappuccino", "tea", "chai",
];

const CAFE_BRANDS: &[&str] = &[
    "starbucks",
    "costa",
    "blue tokai",
    "third wave",
    "barista",
    "chaayos",
    "cafe coffee day",
];

const KEYWORD_BONUS: i32 = 10;
const BRAND_BONUS: i32 = 15;

/// Calculate how cafe-like a candidate is
///
/// Scoring rules (additive):
/// - place types: cafe/coffee_shop +15, bakery +10, restaurant +5,
///   gas_station -20, lodging -15, car_repair -20
/// - cafe vocabulary in the name: +10, once
/// - known cafe brand in the name: +15, once
/// - rating >= 4.5: +10, else rating >= 4.0: +5
/// - more than 100 reviews: +5
///
/// The score can be negative.
pub fn relevance_score(candidate: &PlaceCandidate) -> i32 {
    let name = candidate.name.to_lowercase();

    let type_score: i32 = TYPE_WEIGHTS
        .iter()
        .filter(|(place_type, _)| candidate.has_type(place_type))
        .map(|(_, weight)| weight)
        .sum();

    let keyword_score = if CAFE_KEYWORDS.iter().any(|word| name.contains(word)) {
        KEYWORD_BONUS
    } else {
        0
    };

    let brand_score = if CAFE_BRANDS.iter().any(|brand| name.contains(brand)) {
        BRAND_BONUS
    } else {
        0
    };

    type_score + keyword_score + brand_score + rating_bonus(candidate.rating) + review_bonus(candidate.review_count)
}

/// Whether a score admits a candidate into non-fallback results
#[inline]
pub fn is_relevant(score: i32) -> bool {
    score > 0
}

#[inline]
fn rating_bonus(rating: f64) -> i32 {
    if rating >= 4.5 {
        10
    } else if rating >= 4.0 {
        5
    } else {
        0
    }
}

#[inline]
fn review_bonus(review_count: u32) -> i32 {
    if review_count > 100 {
        5
    } else {
        0
    }
}
