use serde::Serialize;
use utoipa::ToSchema;

use super::photos::{filter_photos_with_fallback, Gallery};
use super::weather::WeatherPanel;
use crate::discovery::models::{Coordinates, DiscoveryResponse, HiddenGem};

const MAP_ZOOM: u8 = 14;
const EXTERNAL_MAP_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// What the embedded map widget needs, and where a click should lead
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapEmbed {
    pub center: Coordinates,
    pub zoom: u8,
    pub marker_title: String,
    pub external_url: String,
}

impl MapEmbed {
    pub fn new(center: Coordinates, marker_title: &str) -> Self {
        Self {
            center,
            zoom: MAP_ZOOM,
            marker_title: marker_title.to_string(),
            external_url: format!("{}{},{}", EXTERNAL_MAP_URL, center.lat, center.lng),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub why_special: String,
    pub best_time: String,
    pub insider_tip: String,
}

/// Render-ready view of one hidden gem
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GemCard {
    pub place_name: String,
    pub address: String,
    pub rating: f64,
    pub review_count: u32,
    pub reviews_label: String,
    /// Inside the nominal hidden-gem band (display hint only)
    pub nominal_gem: bool,
    pub gallery: Gallery,
    pub map: MapEmbed,
    pub coordinates_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherPanel>,
    pub insights: Insights,
}

impl GemCard {
    pub fn from_gem(gem: &HiddenGem, fallback_photo: &str) -> Self {
        let photos = filter_photos_with_fallback(&gem.photos, fallback_photo);

        Self {
            place_name: gem.place_name.clone(),
            address: gem.address.clone(),
            rating: gem.rating,
            review_count: gem.review_count,
            reviews_label: format!("{} reviews", gem.review_count),
            nominal_gem: gem.meets_nominal_threshold(),
            gallery: Gallery::layout(photos, &gem.place_name),
            map: MapEmbed::new(gem.coordinates, &gem.place_name),
            coordinates_label: format!(
                "{:.4}, {:.4}",
                gem.coordinates.lat, gem.coordinates.lng
            ),
            weather: WeatherPanel::from_reading(
                gem.weather.as_ref(),
                gem.analysis.clothing_recommendation.as_deref(),
            ),
            insights: Insights {
                why_special: gem.analysis.why_special.clone(),
                best_time: gem.analysis.best_time.clone(),
                insider_tip: gem.analysis.insider_tip.clone(),
            },
        }
    }
}

/// Rendered result set of one discovery call
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub query: String,
    pub processing_time: f64,
    pub headline: String,
    pub summary: String,
    pub cards: Vec<GemCard>,
}

impl ResultsView {
    pub fn from_response(response: &DiscoveryResponse, fallback_photo: &str) -> Self {
        let count = response.gems.len();
        let (headline, summary) = if count == 0 {
            (
                "No hidden gems found".to_string(),
                "Try adjusting your search query or being more specific about the location and activity type."
                    .to_string(),
            )
        } else {
            let noun = if count == 1 { "place" } else { "places" };
            (
                "Hidden Gems Found".to_string(),
                format!("We found {} amazing {} for you", count, noun),
            )
        };

        Self {
            query: response.query.clone(),
            processing_time: response.processing_time,
            headline,
            summary,
            cards: response
                .gems
                .iter()
                .map(|gem| GemCard::from_gem(gem, fallback_photo))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
