use crate::core::{
    distance::distance_between,
    scoring::{is_relevant, relevance_score},
};
use crate::models::{GeoPoint, PlaceCandidate, ScoredCafe, SearchOutcome, SearchSettings, SearchTier};
use crate::services::{GatewayError, NearbyRequest, PlacesGateway};

const PRIMARY_TYPES: &[&str] = &["cafe"];
const PRIMARY_KEYWORD: &str = "cafe coffee";
const ALTERNATIVE_TYPES: &[&str] = &["food", "bakery", "meal_takeaway"];
const ALTERNATIVE_KEYWORD: &str = "cafe restaurant coffee espresso bakery";
const BASIC_TYPES: &[&str] = &["establishment"];
const BASIC_KEYWORD: &str = "restaurant food drink";

/// Where the cascade goes next
#[derive(Debug, Clone, Copy, PartialEq)]
enum CascadeState {
    Primary { radius_m: u32 },
    AlternativeTerms { radius_m: u32 },
    RadiusExpansion { radius_m: u32 },
    BasicEstablishments,
}

/// Escalating search cascade - widens the query until something cafe-like turns up
///
/// # Tiers
/// 1. Primary: `cafe` type, cafe keywords, requested radius
/// 2. Alternative terms: broader food types and keywords, same radius
/// 3. Radius expansion: alternative terms at a growing radius, up to the cap
/// 4. Basic establishments: any establishment at the cap, tagged as fallback
///
/// Only successful-but-empty answers escalate; a gateway error ends the
/// cascade. The radius never exceeds `radius_cap_m` and the number of
/// upstream calls never exceeds `max_attempts`.
#[derive(Debug, Clone)]
pub struct FallbackSearch {
    settings: SearchSettings,
}

impl FallbackSearch {
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings }
    }

    pub fn with_default_settings() -> Self {
        Self {
            settings: SearchSettings::default(),
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Run the cascade for a user location
    ///
    /// # Arguments
    /// * `gateway` - Upstream places provider
    /// * `origin` - User location, used for distances
    /// * `requested_radius_m` - Validated radius from the request
    pub async fn run(
        &self,
        gateway: &dyn PlacesGateway,
        origin: GeoPoint,
        requested_radius_m: u32,
    ) -> Result<SearchOutcome, GatewayError> {
        let cap = self.settings.radius_cap_m;
        let mut state = CascadeState::Primary {
            radius_m: requested_radius_m.min(cap),
        };
        let mut attempts = 0u32;

        loop {
            // Keep the last allowed call for the terminal tier
            if state != CascadeState::BasicEstablishments && attempts + 1 >= self.settings.max_attempts {
                tracing::debug!("Search attempt cap reached after {} calls", attempts);
                state = CascadeState::BasicEstablishments;
            }

            match state {
                CascadeState::Primary { radius_m } => {
                    attempts += 1;
                    let cafes = self
                        .relevant_batch(gateway, origin, SearchTier::Primary, radius_m)
                        .await?;
                    if !cafes.is_empty() {
                        return Ok(outcome(cafes, SearchTier::Primary, radius_m, attempts));
                    }

                    tracing::debug!("No cafes from primary search at {}m, trying alternative terms", radius_m);
                    state = CascadeState::AlternativeTerms { radius_m };
                }
                CascadeState::AlternativeTerms { radius_m } | CascadeState::RadiusExpansion { radius_m } => {
                    let tier = match state {
                        CascadeState::AlternativeTerms { .. } => SearchTier::AlternativeTerms,
                        _ => SearchTier::RadiusExpansion,
                    };

                    attempts += 1;
                    let cafes = self.relevant_batch(gateway, origin, tier, radius_m).await?;
                    if !cafes.is_empty() {
                        return Ok(outcome(cafes, tier, radius_m, attempts));
                    }

                    state = if radius_m < cap {
                        let next = self.grow_radius(radius_m);
                        tracing::debug!("No cafes at {}m, expanding radius to {}m", radius_m, next);
                        CascadeState::RadiusExpansion { radius_m: next }
                    } else {
                        tracing::debug!("No cafes at the {}m cap, falling back to basic establishments", cap);
                        CascadeState::BasicEstablishments
                    };
                }
                CascadeState::BasicEstablishments => {
                    attempts += 1;
                    return self.basic_establishments(gateway, origin, attempts).await;
                }
            }
        }
    }

    /// Next radius for an expansion step, never above the cap
    fn grow_radius(&self, radius_m: u32) -> u32 {
        let grown = (radius_m as f64 * self.settings.growth_factor).round() as u32;
        grown.max(radius_m + 1).min(self.settings.radius_cap_m)
    }

    /// One tier call, keeping only candidates that pass the relevance gate
    async fn relevant_batch(
        &self,
        gateway: &dyn PlacesGateway,
        origin: GeoPoint,
        tier: SearchTier,
        radius_m: u32,
    ) -> Result<Vec<ScoredCafe>, GatewayError> {
        let page = gateway.nearby_search(&tier_request(tier, origin, radius_m)).await?;
        let raw_count = page.results.len();

        let cafes: Vec<ScoredCafe> = page
            .results
            .into_iter()
            .map(|place| score_candidate(place, origin, false))
            .filter(|cafe| is_relevant(cafe.relevance_score))
            .collect();

        tracing::debug!(
            "{:?} search at {}m: {} raw, {} relevant",
            tier,
            radius_m,
            raw_count,
            cafes.len()
        );

        Ok(cafes)
    }

    /// Terminal tier: any establishment, no relevance gate, tagged as fallback
    async fn basic_establishments(
        &self,
        gateway: &dyn PlacesGateway,
        origin: GeoPoint,
        attempts: u32,
    ) -> Result<SearchOutcome, GatewayError> {
        let radius_m = self.settings.radius_cap_m;
        let page = gateway
            .nearby_search(&tier_request(SearchTier::BasicEstablishments, origin, radius_m))
            .await?;

        if page.results.is_empty() {
            tracing::info!("No establishments found even with basic search");
            return Ok(outcome(vec![], SearchTier::Empty, radius_m, attempts));
        }

        let cafes: Vec<ScoredCafe> = page
            .results
            .into_iter()
            .take(self.settings.fallback_limit)
            .map(|place| score_candidate(place, origin, true))
            .collect();

        tracing::info!("Using {} basic establishments as fallback results", cafes.len());

        Ok(outcome(cafes, SearchTier::BasicEstablishments, radius_m, attempts))
    }
}

impl Default for FallbackSearch {
    fn default() -> Self {
        Self::with_default_settings()
    }
}

/// Upstream query shape for a tier
pub fn tier_request(tier: SearchTier, origin: GeoPoint, radius_m: u32) -> NearbyRequest {
    let (types, keyword) = match tier {
        SearchTier::Primary => (PRIMARY_TYPES, PRIMARY_KEYWORD),
        SearchTier::AlternativeTerms | SearchTier::RadiusExpansion => (ALTERNATIVE_TYPES, ALTERNATIVE_KEYWORD),
        SearchTier::BasicEstablishments | SearchTier::Empty => (BASIC_TYPES, BASIC_KEYWORD),
    };

    NearbyRequest {
        location: origin,
        radius_m,
        keyword: Some(keyword.to_string()),
        types: types.iter().map(|t| t.to_string()).collect(),
    }
}

/// Score a candidate and measure its distance from the user
pub fn score_candidate(place: PlaceCandidate, origin: GeoPoint, is_fallback_result: bool) -> ScoredCafe {
    let relevance_score = relevance_score(&place);
    let distance_km = distance_between(Some(origin), place.location);

    ScoredCafe {
        place,
        relevance_score,
        distance_km,
        is_fallback_result,
    }
}

fn outcome(cafes: Vec<ScoredCafe>, tier: SearchTier, search_radius_m: u32, attempts: u32) -> SearchOutcome {
    SearchOutcome {
        cafes,
        tier,
        search_radius_m,
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeocodeResult, PlaceDetails, Prediction};
    use crate::services::NearbyPage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    type Responder = Box<dyn Fn(&NearbyRequest) -> Result<NearbyPage, GatewayError> + Send + Sync>;

    /// Gateway that answers nearby searches from a closure and records calls
    struct ScriptedGateway {
        respond: Responder,
        calls: Mutex<Vec<NearbyRequest>>,
    }

    impl ScriptedGateway {
        fn new(respond: impl Fn(&NearbyRequest) -> Result<NearbyPage, GatewayError> + Send + Sync + 'static) -> Self {
            Self {
                respond: Box::new(respond),
                calls: Mutex::new(vec![]),
            }
        }

        fn calls(&self) -> Vec<NearbyRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PlacesGateway for ScriptedGateway {
        async fn nearby_search(&self, request: &NearbyRequest) -> Result<NearbyPage, GatewayError> {
            self.calls.lock().unwrap().push(request.clone());
            (self.respond)(request)
        }

        async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, GatewayError> {
            Err(GatewayError::InvalidResponse(place_id.to_string()))
        }

        async fn geocode(&self, _address: &str) -> Result<Option<GeocodeResult>, GatewayError> {
            Ok(None)
        }

        async fn autocomplete(&self, _input: &str, _types: &str) -> Result<Vec<Prediction>, GatewayError> {
            Ok(vec![])
        }

        fn photo_url(&self, reference: &str, max_width: u32) -> String {
            format!("photo/{}/{}", reference, max_width)
        }
    }

    fn place(id: &str, name: &str, types: &[&str]) -> PlaceCandidate {
        PlaceCandidate {
            id: id.to_string(),
            name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            rating: 4.2,
            review_count: 10,
            price_level: Some(1),
            location: Some(GeoPoint::new(12.975, 77.595)),
            photos: vec![],
            business_status: "OPERATIONAL".to_string(),
            address: String::new(),
            is_open: None,
        }
    }

    fn page(places: Vec<PlaceCandidate>) -> Result<NearbyPage, GatewayError> {
        Ok(NearbyPage {
            results: places,
            next_page_token: None,
        })
    }

    fn origin() -> GeoPoint {
        GeoPoint::new(12.97, 77.59)
    }

    #[tokio::test]
    async fn test_primary_hit_stops_cascade() {
        let gateway = ScriptedGateway::new(|_| page(vec![place("1", "Brew Lab", &["cafe"])]));
        let outcome = FallbackSearch::default().run(&gateway, origin(), 5000).await.unwrap();

        assert_eq!(outcome.tier, SearchTier::Primary);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.cafes.len(), 1);
        assert!(outcome.cafes[0].distance_km.is_some());
        assert_eq!(gateway.calls()[0].types, vec!["cafe"]);
    }

    #[tokio::test]
    async fn test_irrelevant_primary_escalates_to_alternative_terms() {
        let gateway = ScriptedGateway::new(|req| {
            if req.types[0] == "cafe" {
                page(vec![place("g", "Fuel Stop", &["gas_station"])])
            } else {
                page(vec![place("b", "Daily Bakes", &["bakery"])])
            }
        });
        let outcome = FallbackSearch::default().run(&gateway, origin(), 3000).await.unwrap();

        assert_eq!(outcome.tier, SearchTier::AlternativeTerms);
        assert_eq!(outcome.search_radius_m, 3000);
        assert_eq!(outcome.cafes[0].place.id, "b");
        assert!(!outcome.cafes[0].is_fallback_result);
    }

    #[tokio::test]
    async fn test_radius_expansion_until_results() {
        let gateway = ScriptedGateway::new(|req| {
            if req.types[0] == "food" && req.radius_m >= 8000 {
                page(vec![place("b", "Chai Point", &["food"])])
            } else {
                page(vec![])
            }
        });
        let outcome = FallbackSearch::default().run(&gateway, origin(), 2000).await.unwrap();

        assert_eq!(outcome.tier, SearchTier::RadiusExpansion);
        assert_eq!(outcome.search_radius_m, 8000);

        let radii: Vec<u32> = gateway.calls().iter().map(|c| c.radius_m).collect();
        assert_eq!(radii, vec![2000, 2000, 4000, 8000]);
    }

    #[tokio::test]
    async fn test_exhausted_cascade_tags_fallback_results() {
        let gateway = ScriptedGateway::new(|req| {
            if req.types[0] == "establishment" {
                let places = (0..20).map(|i| place(&i.to_string(), "Hardware Depot", &["store"])).collect();
                page(places)
            } else {
                page(vec![])
            }
        });
        let outcome = FallbackSearch::default().run(&gateway, origin(), 5000).await.unwrap();

        assert_eq!(outcome.tier, SearchTier::BasicEstablishments);
        assert!(outcome.is_fallback());
        assert_eq!(outcome.cafes.len(), 15);
        assert!(outcome.cafes.iter().all(|c| c.is_fallback_result));

        let calls = gateway.calls();
        assert!(calls.iter().all(|c| c.radius_m <= 20_000));
        assert_eq!(calls.last().unwrap().radius_m, 20_000);
    }

    #[tokio::test]
    async fn test_nothing_anywhere_is_empty() {
        let gateway = ScriptedGateway::new(|_| page(vec![]));
        let outcome = FallbackSearch::default().run(&gateway, origin(), 50_000).await.unwrap();

        assert_eq!(outcome.tier, SearchTier::Empty);
        assert!(outcome.cafes.is_empty());
        // Requested 50 km is searched at the 20 km cap: primary, alternative, basic
        assert_eq!(outcome.attempts, 3);
        assert!(gateway.calls().iter().all(|c| c.radius_m == 20_000));
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let settings = SearchSettings {
            growth_factor: 1.1,
            max_attempts: 5,
            ..SearchSettings::default()
        };
        let gateway = ScriptedGateway::new(|_| page(vec![]));
        let outcome = FallbackSearch::new(settings).run(&gateway, origin(), 100).await.unwrap();

        assert_eq!(outcome.attempts, 5);
        assert_eq!(gateway.calls().len(), 5);
        assert_eq!(gateway.calls().last().unwrap().types, vec!["establishment"]);
    }

    #[tokio::test]
    async fn test_gateway_error_is_not_escalated() {
        let gateway = ScriptedGateway::new(|_| {
            Err(GatewayError::Api {
                status: "REQUEST_DENIED".to_string(),
                message: "bad key".to_string(),
            })
        });
        let result = FallbackSearch::default().run(&gateway, origin(), 5000).await;

        assert!(result.is_err());
        assert_eq!(gateway.calls().len(), 1);
    }

    #[test]
    fn test_grow_radius_is_capped() {
        let search = FallbackSearch::default();
        assert_eq!(search.grow_radius(5000), 10_000);
        assert_eq!(search.grow_radius(15_000), 20_000);
    }
}
