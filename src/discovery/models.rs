use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Wire Models (shared with the discovery backend)
// ============================================================================

/// Body of `POST /api/discover`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest {
    pub search_query: String,
}

impl DiscoveryRequest {
    pub fn new(search_query: impl Into<String>) -> Self {
        Self {
            search_query: search_query.into(),
        }
    }
}

/// WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Review-derived commentary produced by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub why_special: String,
    pub best_time: String,
    pub insider_tip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clothing_recommendation: Option<String>,
}

/// Weather reading attached to a gem, when the backend could fetch one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Relative humidity, 0-100
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_humidity"
    )]
    pub humidity: Option<u8>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_precipitation: bool,
}

impl WeatherInfo {
    /// A reading is usable only when the backend actually resolved conditions.
    /// The backend reports failures as text such as "Location unavailable".
    pub fn is_valid(&self) -> bool {
        let conditions = self.conditions.trim();
        !conditions.is_empty() && !conditions.to_lowercase().contains("unavailable")
    }
}

/// One discovered place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HiddenGem {
    pub place_name: String,
    pub address: String,
    pub coordinates: Coordinates,
    /// Expected 0.0-5.0
    pub rating: f64,
    pub review_count: u32,
    #[serde(default)]
    pub photos: Vec<String>,
    pub analysis: Analysis,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_weather"
    )]
    pub weather: Option<WeatherInfo>,
}

/// Nominal hidden-gem thresholds. The backend filters on these; this crate only labels.
pub const GEM_MIN_RATING: f64 = 4.0;
pub const GEM_MAX_REVIEWS: u32 = 300;

impl HiddenGem {
    /// Whether the displayed values sit inside the nominal hidden-gem band.
    /// Never used to drop results.
    pub fn meets_nominal_threshold(&self) -> bool {
        self.rating >= GEM_MIN_RATING && self.review_count < GEM_MAX_REVIEWS
    }
}

/// Result of one discovery call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResponse {
    pub gems: Vec<HiddenGem>,
    /// Backend processing time in seconds
    pub processing_time: f64,
    /// Echo of the submitted query
    pub query: String,
}

impl DiscoveryResponse {
    /// An empty result set is a valid terminal state, not a failure
    pub fn is_empty(&self) -> bool {
        self.gems.is_empty()
    }
}

/// Structured failure body returned by the backend on non-2xx responses.
/// Every field is optional; the backend and the forwarding route emit different subsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl BackendErrorBody {
    /// Compose the user-facing message: `detail` (else `error`, else `fallback`),
    /// followed by the hint on its own paragraph.
    pub fn compose_message(&self, fallback: &str) -> String {
        let headline = non_blank(&self.detail)
            .or_else(|| non_blank(&self.error))
            .unwrap_or(fallback);

        match non_blank(&self.hint) {
            Some(hint) => format!("{}\n\n{}", headline, hint),
            None => headline.to_string(),
        }
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

// ============================================================================
// Lenient Deserializers
// ============================================================================

// The backend fills weather fields on a best-effort basis and may send null
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_humidity<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let humidity = Option::<f64>::deserialize(deserializer)?;
    Ok(humidity
        .filter(|h| h.is_finite())
        .map(|h| h.round().clamp(0.0, 100.0) as u8))
}

/// A reading that still cannot be decoded drops only the weather panel, never the gem
fn deserialize_weather<'de, D>(deserializer: D) -> Result<Option<WeatherInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(raw) {
        Ok(weather) => Ok(Some(weather)),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed weather reading");
            Ok(None)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case() {
        let json = serde_json::to_value(DiscoveryRequest::new("quiet surf spot in Bali")).unwrap();
        assert_eq!(json, serde_json::json!({ "searchQuery": "quiet surf spot in Bali" }));
    }

    #[test]
    fn test_response_parses_documented_schema() {
        let body = serde_json::json!({
            "gems": [{
                "placeName": "Balangan Beach",
                "address": "Jl. Pantai Balangan, Bali",
                "coordinates": { "lat": -8.7913, "lng": 115.1236 },
                "rating": 4.6,
                "reviewCount": 142,
                "photos": ["https://images.unsplash.com/photo-1.jpg"],
                "analysis": {
                    "whySpecial": "Gentle reef break",
                    "bestTime": "Early morning",
                    "insiderTip": "Go north",
                    "clothingRecommendation": "Rash guard"
                },
                "weather": {
                    "conditions": "Sunny",
                    "temperature": 84.5,
                    "humidity": 70,
                    "hasPrecipitation": false
                }
            }],
            "processingTime": 12.5,
            "query": "quiet surf spot in Bali"
        });

        let parsed: DiscoveryResponse = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(parsed.gems.len(), 1);
        assert_eq!(parsed.gems[0].review_count, 142);
        assert_eq!(
            parsed.gems[0].analysis.clothing_recommendation.as_deref(),
            Some("Rash guard")
        );
        assert_eq!(parsed.gems[0].weather.as_ref().unwrap().humidity, Some(70));

        // Every field survives serialization back to the wire shape
        assert_eq!(serde_json::to_value(&parsed).unwrap(), body);
    }

    #[test]
    fn test_optional_fields_default_when_missing() {
        let body = serde_json::json!({
            "placeName": "Seljalandsfoss back trail",
            "address": "Iceland",
            "coordinates": { "lat": 63.6156, "lng": -19.9886 },
            "rating": 4.8,
            "reviewCount": 90,
            "analysis": { "whySpecial": "a", "bestTime": "b", "insiderTip": "c" },
            "weather": { "conditions": "Overcast" }
        });

        let gem: HiddenGem = serde_json::from_value(body).unwrap();
        assert!(gem.photos.is_empty());
        assert!(gem.analysis.clothing_recommendation.is_none());
        let weather = gem.weather.unwrap();
        assert!(!weather.has_precipitation);
        assert!(weather.temperature.is_none());
    }

    fn gem_json(name: &str, weather: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "placeName": name,
            "address": "Iceland",
            "coordinates": { "lat": 63.6156, "lng": -19.9886 },
            "rating": 4.8,
            "reviewCount": 90,
            "analysis": { "whySpecial": "a", "bestTime": "b", "insiderTip": "c" },
            "weather": weather
        })
    }

    #[test]
    fn test_loose_weather_fields_keep_every_gem() {
        let body = serde_json::json!({
            "gems": [
                gem_json("Null precipitation", serde_json::json!({ "conditions": "Sunny", "hasPrecipitation": null })),
                gem_json("Float humidity", serde_json::json!({ "conditions": "Sunny", "humidity": 55.4 })),
                gem_json("Null conditions", serde_json::json!({ "conditions": null })),
                gem_json("Null weather", serde_json::Value::Null),
            ],
            "processingTime": 3.0,
            "query": "waterfall near Reykjavik"
        });

        let parsed: DiscoveryResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.gems.len(), 4);

        let weather = parsed.gems[0].weather.as_ref().unwrap();
        assert!(!weather.has_precipitation);
        assert!(weather.is_valid());

        assert_eq!(parsed.gems[1].weather.as_ref().unwrap().humidity, Some(55));

        // Present but unusable: kept, then gated out by is_valid
        let weather = parsed.gems[2].weather.as_ref().unwrap();
        assert!(weather.conditions.is_empty());
        assert!(!weather.is_valid());

        assert!(parsed.gems[3].weather.is_none());
    }

    #[test]
    fn test_undecodable_weather_drops_only_the_reading() {
        let body = serde_json::json!({
            "gems": [
                gem_json("Broken", serde_json::json!({ "conditions": "Sunny", "temperature": "hot" })),
                gem_json("Not an object", serde_json::json!("Weather unavailable")),
                gem_json("Fine", serde_json::json!({ "conditions": "Overcast" })),
            ],
            "processingTime": 3.0,
            "query": "waterfall near Reykjavik"
        });

        let parsed: DiscoveryResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.gems.len(), 3);
        assert!(parsed.gems[0].weather.is_none());
        assert!(parsed.gems[1].weather.is_none());
        assert_eq!(parsed.gems[2].weather.as_ref().unwrap().conditions, "Overcast");
    }

    #[test]
    fn test_weather_validity() {
        let mut weather = WeatherInfo {
            conditions: "Partly cloudy".to_string(),
            temperature: Some(61.0),
            humidity: Some(55),
            has_precipitation: false,
        };
        assert!(weather.is_valid());

        weather.conditions = "Location UNAVAILABLE".to_string();
        assert!(!weather.is_valid());

        weather.conditions = "Weather data unavailable".to_string();
        assert!(!weather.is_valid());

        weather.conditions = "   ".to_string();
        assert!(!weather.is_valid());
    }

    #[test]
    fn test_nominal_threshold_is_label_only() {
        let mut gem = fixtures::gem("Balangan Beach");
        assert!(gem.meets_nominal_threshold());

        gem.review_count = 300;
        assert!(!gem.meets_nominal_threshold());

        gem.review_count = 10;
        gem.rating = 3.9;
        assert!(!gem.meets_nominal_threshold());
    }

    #[test]
    fn test_error_body_composes_detail_and_hint() {
        let body: BackendErrorBody =
            serde_json::from_str(r#"{"error":"X","detail":"Y","hint":"Z"}"#).unwrap();
        let message = body.compose_message("fallback");
        assert!(message.contains('Y'));
        assert!(message.contains('Z'));
        assert_eq!(message, "Y\n\nZ");
    }

    #[test]
    fn test_error_body_fallbacks() {
        let only_error: BackendErrorBody = serde_json::from_str(r#"{"error":"X"}"#).unwrap();
        assert_eq!(only_error.compose_message("fallback"), "X");

        let empty = BackendErrorBody::default();
        assert_eq!(empty.compose_message("fallback"), "fallback");

        let blank_detail: BackendErrorBody =
            serde_json::from_str(r#"{"error":"X","detail":""}"#).unwrap();
        assert_eq!(blank_detail.compose_message("fallback"), "X");
    }
}
