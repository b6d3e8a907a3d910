use serde::Serialize;
use utoipa::ToSchema;

use crate::discovery::models::WeatherInfo;

/// Keyword groups checked in order; the first match wins
const CONDITION_EMOJI: &[(&[&str], &str)] = &[
    (&["sunny", "clear"], "☀️"),
    (&["cloud", "overcast"], "☁️"),
    (&["rain", "shower"], "🌧️"),
    (&["storm", "thunder"], "⛈️"),
    (&["snow", "flurr"], "❄️"),
    (&["fog", "mist"], "🌫️"),
    (&["wind"], "💨"),
    (&["hot", "heat"], "🔥"),
];
const PRECIPITATION_EMOJI: &str = "🌧️";
const DEFAULT_EMOJI: &str = "🌤️";

/// Pick an icon for a free-text conditions string
pub fn weather_emoji(conditions: &str, has_precipitation: bool) -> &'static str {
    if has_precipitation {
        return PRECIPITATION_EMOJI;
    }

    let lower = conditions.to_lowercase();
    CONDITION_EMOJI
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, emoji)| *emoji)
        .unwrap_or(DEFAULT_EMOJI)
}

/// Current-weather section of a card
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPanel {
    pub emoji: String,
    pub conditions: String,
    /// Whole degrees Fahrenheit, as reported by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_f: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<u8>,
    /// "What to wear" advice from the analysis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clothing: Option<String>,
}

impl WeatherPanel {
    /// Build the panel, or `None` when the reading is missing or unusable
    pub fn from_reading(weather: Option<&WeatherInfo>, clothing: Option<&str>) -> Option<Self> {
        let weather = weather.filter(|w| w.is_valid())?;

        Some(Self {
            emoji: weather_emoji(&weather.conditions, weather.has_precipitation).to_string(),
            conditions: weather.conditions.clone(),
            temperature_f: weather
                .temperature
                .filter(|t| t.is_finite())
                .map(|t| t.round() as i64),
            humidity_pct: weather.humidity.map(|h| h.min(100)),
            clothing: clothing
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(conditions: &str) -> WeatherInfo {
        WeatherInfo {
            conditions: conditions.to_string(),
            temperature: Some(71.6),
            humidity: Some(64),
            has_precipitation: false,
        }
    }

    #[test]
    fn test_emoji_keywords() {
        assert_eq!(weather_emoji("Clear sky", false), "☀️");
        assert_eq!(weather_emoji("Mostly Cloudy", false), "☁️");
        assert_eq!(weather_emoji("Light showers", false), "🌧️");
        assert_eq!(weather_emoji("Thunderstorms", false), "⛈️");
        assert_eq!(weather_emoji("Snow flurries", false), "❄️");
        assert_eq!(weather_emoji("Patchy fog", false), "🌫️");
        assert_eq!(weather_emoji("Windy", false), "💨");
        assert_eq!(weather_emoji("Heat advisory", false), "🔥");
        assert_eq!(weather_emoji("Fair", false), "🌤️");
    }

    #[test]
    fn test_precipitation_overrides_conditions() {
        assert_eq!(weather_emoji("Sunny", true), "🌧️");
    }

    #[test]
    fn test_first_matching_group_wins() {
        // "cloud" is checked before "rain"
        assert_eq!(weather_emoji("Cloudy with rain later", false), "☁️");
    }

    #[test]
    fn test_panel_from_valid_reading() {
        let weather = reading("Sunny");
        let panel = WeatherPanel::from_reading(Some(&weather), Some("Light layers")).unwrap();
        assert_eq!(panel.emoji, "☀️");
        assert_eq!(panel.temperature_f, Some(72));
        assert_eq!(panel.humidity_pct, Some(64));
        assert_eq!(panel.clothing.as_deref(), Some("Light layers"));
    }

    #[test]
    fn test_no_panel_for_unavailable_reading() {
        let weather = reading("Location unavailable");
        assert!(WeatherPanel::from_reading(Some(&weather), Some("Boots")).is_none());
        assert!(WeatherPanel::from_reading(None, None).is_none());
    }

    #[test]
    fn test_blank_clothing_is_dropped() {
        let weather = reading("Overcast");
        let panel = WeatherPanel::from_reading(Some(&weather), Some("  ")).unwrap();
        assert!(panel.clothing.is_none());
    }
}
