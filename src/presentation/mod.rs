//! Render-ready view models built from discovery results.
//!
//! Nothing here talks to the network; these types describe what a client
//! draws for each gem (gallery, map embed, weather panel, insights).

pub mod card;
pub mod photos;
pub mod weather;

pub use card::{GemCard, Insights, MapEmbed, ResultsView};
pub use photos::{filter_photos, filter_photos_with_fallback, Gallery, MoreTile, PhotoTile};
pub use weather::{weather_emoji, WeatherPanel};
