use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use crate::models::{GeoPoint, GeocodeResult, PhotoRef, PlaceCandidate, PlaceDetails, Prediction, Review};
use crate::services::places::{GatewayError, NearbyPage, NearbyRequest, PlacesGateway};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Placeholder shipped in sample env files; treated as "no key"
pub const PLACEHOLDER_API_KEY: &str = "your_google_places_api_key_here";

const DETAIL_FIELDS: &str = "place_id,name,geometry,rating,user_ratings_total,price_level,photos,\
opening_hours,formatted_address,reviews,website,formatted_phone_number,types,business_status,vicinity";

/// Google Places web service client
///
/// Handles all communication with the Google Maps platform:
/// - Nearby search
/// - Place details
/// - Geocoding
/// - Autocomplete predictions
pub struct GooglePlacesClient {
    base_url: String,
    api_key: String,
    autocomplete_components: Option<String>,
    client: Client,
}

impl GooglePlacesClient {
    /// Create a new client; `timeout` bounds every upstream call
    pub fn new(
        base_url: String,
        api_key: String,
        autocomplete_components: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            autocomplete_components,
            client,
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != PLACEHOLDER_API_KEY
    }

    fn api_key(&self) -> Result<&str, GatewayError> {
        if self.has_api_key() {
            Ok(&self.api_key)
        } else {
            Err(GatewayError::MissingApiKey)
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// GET a Places endpoint and decode its JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let mut pairs = params.to_vec();
        pairs.push(("key", self.api_key()?));

        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        tracing::debug!("Calling Places API: {}", path);

        let response = self
            .client
            .get(format!("{}?{}", self.endpoint(path), query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::Api {
                status: response.status().to_string(),
                message: format!("HTTP error from {}", path),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| GatewayError::InvalidResponse(format!("{}: {}", path, e)))
    }
}

/// Outcome of a Google `status` field
#[derive(Debug, PartialEq)]
enum ApiStatus {
    Ok,
    ZeroResults,
}

fn check_status(status: &str, error_message: Option<&str>) -> Result<ApiStatus, GatewayError> {
    match status {
        "OK" => Ok(ApiStatus::Ok),
        "ZERO_RESULTS" => Ok(ApiStatus::ZeroResults),
        other => Err(GatewayError::Api {
            status: other.to_string(),
            message: error_message.unwrap_or_default().to_string(),
        }),
    }
}

#[derive(Debug, Deserialize)]
struct NearbyBody {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GooglePlace>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsBody {
    status: String,
    error_message: Option<String>,
    result: Option<GooglePlace>,
}

#[derive(Debug, Deserialize)]
struct GeocodeBody {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeEntry>,
}

#[derive(Debug, Deserialize)]
struct GeocodeEntry {
    geometry: Geometry,
    #[serde(default)]
    formatted_address: String,
}

#[derive(Debug, Deserialize)]
struct AutocompleteBody {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    predictions: Vec<GooglePrediction>,
}

#[derive(Debug, Deserialize)]
struct GooglePrediction {
    place_id: String,
    description: String,
    structured_formatting: Option<StructuredFormatting>,
}

#[derive(Debug, Deserialize)]
struct StructuredFormatting {
    main_text: Option<String>,
    secondary_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: GeoPoint,
}

#[derive(Debug, Deserialize)]
struct GooglePhoto {
    photo_reference: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    open_now: Option<bool>,
    #[serde(default)]
    weekday_text: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleReview {
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    relative_time_description: String,
    profile_photo_url: Option<String>,
}

/// Place record as Google returns it
#[derive(Debug, Deserialize)]
struct GooglePlace {
    place_id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    types: Vec<String>,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
    price_level: Option<u8>,
    geometry: Option<Geometry>,
    #[serde(default)]
    photos: Vec<GooglePhoto>,
    business_status: Option<String>,
    vicinity: Option<String>,
    formatted_address: Option<String>,
    opening_hours: Option<OpeningHours>,
    website: Option<String>,
    formatted_phone_number: Option<String>,
    #[serde(default)]
    reviews: Vec<GoogleReview>,
}

impl GooglePlace {
    /// Convert to a candidate; places without an id are unusable and dropped
    ///
    /// Nearby results prefer the short `vicinity` address, details prefer the
    /// full `formatted_address`.
    fn to_candidate(&self, prefer_formatted_address: bool) -> Option<PlaceCandidate> {
        let id = self.place_id.clone()?;

        let address = if prefer_formatted_address {
            self.formatted_address.as_ref().or(self.vicinity.as_ref())
        } else {
            self.vicinity.as_ref().or(self.formatted_address.as_ref())
        };

        Some(PlaceCandidate {
            id,
            name: self.name.clone().unwrap_or_else(|| "Unknown Cafe".to_string()),
            types: self.types.clone(),
            rating: self.rating.unwrap_or(0.0),
            review_count: self.user_ratings_total.unwrap_or(0),
            price_level: self.price_level,
            location: self.geometry.as_ref().map(|g| g.location),
            photos: self
                .photos
                .iter()
                .map(|p| PhotoRef {
                    reference: p.photo_reference.clone(),
                    width: p.width,
                    height: p.height,
                })
                .collect(),
            business_status: self
                .business_status
                .clone()
                .unwrap_or_else(crate::models::domain::default_business_status),
            address: address.cloned().unwrap_or_default(),
            is_open: self.opening_hours.as_ref().and_then(|h| h.open_now),
        })
    }

    fn into_details(self) -> Option<PlaceDetails> {
        let place = self.to_candidate(true)?;

        Some(PlaceDetails {
            place,
            website: self.website,
            phone: self.formatted_phone_number,
            reviews: self
                .reviews
                .into_iter()
                .map(|r| Review {
                    author: r.author_name,
                    rating: r.rating,
                    text: r.text,
                    time: r.relative_time_description,
                    profile_photo: r.profile_photo_url,
                })
                .collect(),
            opening_hours: self.opening_hours.map(|h| h.weekday_text).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl PlacesGateway for GooglePlacesClient {
    async fn nearby_search(&self, request: &NearbyRequest) -> Result<NearbyPage, GatewayError> {
        let location = format!("{},{}", request.location.lat, request.location.lng);
        let radius = request.radius_m.to_string();

        let mut params = vec![("location", location.as_str()), ("radius", radius.as_str())];
        // The web service takes a single type
        if let Some(place_type) = request.types.first() {
            params.push(("type", place_type.as_str()));
        }
        if let Some(keyword) = request.keyword.as_deref() {
            params.push(("keyword", keyword));
        }

        let body: NearbyBody = self.get_json("place/nearbysearch/json", &params).await?;

        match check_status(&body.status, body.error_message.as_deref())? {
            ApiStatus::ZeroResults => Ok(NearbyPage::default()),
            ApiStatus::Ok => {
                let results: Vec<PlaceCandidate> = body
                    .results
                    .iter()
                    .filter_map(|place| place.to_candidate(false))
                    .collect();

                tracing::debug!(
                    "Nearby search returned {} places (radius {}m)",
                    results.len(),
                    request.radius_m
                );

                Ok(NearbyPage {
                    results,
                    next_page_token: body.next_page_token,
                })
            }
        }
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, GatewayError> {
        let body: DetailsBody = self
            .get_json(
                "place/details/json",
                &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
            )
            .await?;

        // Details has no meaningful "zero results": anything but OK is a failure
        let status = check_status(&body.status, body.error_message.as_deref())?;
        match status {
            ApiStatus::Ok => body
                .result
                .and_then(GooglePlace::into_details)
                .ok_or_else(|| GatewayError::InvalidResponse("Missing place in details result".into())),
            ApiStatus::ZeroResults => Err(GatewayError::Api {
                status: body.status,
                message: format!("No details for place {}", place_id),
            }),
        }
    }

    async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, GatewayError> {
        let body: GeocodeBody = self.get_json("geocode/json", &[("address", address)]).await?;

        match check_status(&body.status, body.error_message.as_deref())? {
            ApiStatus::ZeroResults => Ok(None),
            ApiStatus::Ok => Ok(body.results.into_iter().next().map(|entry| GeocodeResult {
                lat: entry.geometry.location.lat,
                lng: entry.geometry.location.lng,
                formatted_address: entry.formatted_address,
            })),
        }
    }

    async fn autocomplete(&self, input: &str, types: &str) -> Result<Vec<Prediction>, GatewayError> {
        let mut params = vec![("input", input), ("types", types)];
        if let Some(components) = self.autocomplete_components.as_deref() {
            params.push(("components", components));
        }

        let body: AutocompleteBody = self.get_json("place/autocomplete/json", &params).await?;

        match check_status(&body.status, body.error_message.as_deref())? {
            ApiStatus::ZeroResults => Ok(vec![]),
            ApiStatus::Ok => Ok(body
                .predictions
                .into_iter()
                .map(|p| {
                    let formatting = p.structured_formatting;
                    let main_text = formatting
                        .as_ref()
                        .and_then(|f| f.main_text.clone())
                        .unwrap_or_else(|| p.description.clone());
                    let secondary_text = formatting
                        .and_then(|f| f.secondary_text)
                        .unwrap_or_default();

                    Prediction {
                        place_id: p.place_id,
                        description: p.description,
                        main_text,
                        secondary_text,
                    }
                })
                .collect()),
        }
    }

    fn photo_url(&self, reference: &str, max_width: u32) -> String {
        format!(
            "{}?maxwidth={}&photo_reference={}&key={}",
            self.endpoint("place/photo"),
            max_width,
            urlencoding::encode(reference),
            urlencoding::encode(&self.api_key)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(base_url: String) -> GooglePlacesClient {
        GooglePlacesClient::new(base_url, "test_key".to_string(), Some("country:in".to_string()), Duration::from_secs(5))
            .unwrap()
    }

    fn nearby_request() -> NearbyRequest {
        NearbyRequest {
            location: GeoPoint::new(12.97, 77.59),
            radius_m: 1500,
            keyword: Some("cafe coffee".to_string()),
            types: vec!["cafe".to_string(), "bakery".to_string()],
        }
    }

    #[test]
    fn test_missing_api_key_detected() {
        let client = GooglePlacesClient::new(
            DEFAULT_BASE_URL.to_string(),
            PLACEHOLDER_API_KEY.to_string(),
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(!client.has_api_key());
        assert!(matches!(client.api_key(), Err(GatewayError::MissingApiKey)));
    }

    #[test]
    fn test_check_status() {
        assert_eq!(check_status("OK", None).unwrap(), ApiStatus::Ok);
        assert_eq!(check_status("ZERO_RESULTS", None).unwrap(), ApiStatus::ZeroResults);
        assert!(matches!(
            check_status("REQUEST_DENIED", Some("bad key")),
            Err(GatewayError::Api { .. })
        ));
    }

    #[test]
    fn test_photo_url() {
        let client = client_for("https://maps.test/api/".to_string());
        assert_eq!(
            client.photo_url("ref123", 400),
            "https://maps.test/api/place/photo?maxwidth=400&photo_reference=ref123&key=test_key"
        );
    }

    #[tokio::test]
    async fn test_nearby_search_parses_results() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/place/nearbysearch/json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("location".into(), "12.97,77.59".into()),
                Matcher::UrlEncoded("radius".into(), "1500".into()),
                Matcher::UrlEncoded("type".into(), "cafe".into()),
                Matcher::UrlEncoded("keyword".into(), "cafe coffee".into()),
                Matcher::UrlEncoded("key".into(), "test_key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "status": "OK",
                    "next_page_token": "page2",
                    "results": [
                        {
                            "place_id": "abc",
                            "name": "Brew Lab",
                            "types": ["cafe", "food"],
                            "rating": 4.6,
                            "user_ratings_total": 320,
                            "price_level": 2,
                            "geometry": {"location": {"lat": 12.971, "lng": 77.591}},
                            "photos": [{"photo_reference": "p1", "width": 800, "height": 600}],
                            "vicinity": "MG Road",
                            "opening_hours": {"open_now": true}
                        },
                        {"name": "No Id Place"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(server.url());
        let page = client.nearby_search(&nearby_request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("page2"));

        let place = &page.results[0];
        assert_eq!(place.id, "abc");
        assert_eq!(place.review_count, 320);
        assert_eq!(place.price_level, Some(2));
        assert_eq!(place.address, "MG Road");
        assert_eq!(place.is_open, Some(true));
        assert_eq!(place.business_status, "OPERATIONAL");
        assert_eq!(place.photos[0].reference, "p1");
    }

    #[tokio::test]
    async fn test_zero_results_is_empty_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/place/nearbysearch/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status": "ZERO_RESULTS", "results": []}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let page = client.nearby_search(&nearby_request()).await.unwrap();
        assert!(page.results.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/place/nearbysearch/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status": "OVER_QUERY_LIMIT", "error_message": "quota"}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.nearby_search(&nearby_request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Api { ref status, .. } if status == "OVER_QUERY_LIMIT"));
    }

    #[tokio::test]
    async fn test_geocode_zero_results_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/geocode/json")
            .match_query(Matcher::UrlEncoded("address".into(), "Nowhere Land".into()))
            .with_status(200)
            .with_body(r#"{"status": "ZERO_RESULTS", "results": []}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        assert_eq!(client.geocode("Nowhere Land").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_place_details_prefers_formatted_address() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/place/details/json")
            .match_query(Matcher::UrlEncoded("place_id".into(), "abc".into()))
            .with_status(200)
            .with_body(
                r#"{
                    "status": "OK",
                    "result": {
                        "place_id": "abc",
                        "name": "Brew Lab",
                        "geometry": {"location": {"lat": 12.971, "lng": 77.591}},
                        "vicinity": "MG Road",
                        "formatted_address": "12 MG Road, Bengaluru",
                        "website": "https://brewlab.test",
                        "opening_hours": {"open_now": false, "weekday_text": ["Monday: 8 AM - 9 PM"]},
                        "reviews": [{"author_name": "Asha", "rating": 5, "text": "Great", "relative_time_description": "a week ago"}]
                    }
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(server.url());
        let details = client.place_details("abc").await.unwrap();

        assert_eq!(details.place.address, "12 MG Road, Bengaluru");
        assert_eq!(details.website.as_deref(), Some("https://brewlab.test"));
        assert_eq!(details.opening_hours, vec!["Monday: 8 AM - 9 PM"]);
        assert_eq!(details.reviews[0].author, "Asha");
        assert_eq!(details.place.is_open, Some(false));
    }

    #[tokio::test]
    async fn test_autocomplete_falls_back_to_description() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/place/autocomplete/json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("input".into(), "kora".into()),
                Matcher::UrlEncoded("components".into(), "country:in".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{
                    "status": "OK",
                    "predictions": [
                        {"place_id": "p1", "description": "Koramangala, Bengaluru",
                         "structured_formatting": {"main_text": "Koramangala", "secondary_text": "Bengaluru"}},
                        {"place_id": "p2", "description": "Kora Lane"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(server.url());
        let predictions = client.autocomplete("kora", "geocode").await.unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].main_text, "Koramangala");
        assert_eq!(predictions[1].main_text, "Kora Lane");
        assert_eq!(predictions[1].secondary_text, "");
    }
}
