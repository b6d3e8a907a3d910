use indexmap::IndexSet;
use reqwest::Url;
use serde::Serialize;
use utoipa::ToSchema;

/// Tiles rendered in the grid before the "+N more" tile
const MAX_GALLERY_TILES: usize = 5;
const PRIMARY_TILE_PX: u32 = 600;
const SECONDARY_TILE_PX: u32 = 300;

/// Hosts that serve photos directly
const IMAGE_HOSTS: &[&str] = &["lh3.googleusercontent.com", "images.unsplash.com"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "avif"];

/// Google serves both place photos and static maps from this host
const GOOGLE_MAPS_API_HOST: &str = "maps.googleapis.com";
const PLACE_PHOTO_PATH: &str = "/maps/api/place/photo";

/// Map pages and tiles. Never images, even if a path looks like one.
fn is_map_endpoint(url: &Url) -> bool {
    let host = url.host_str().unwrap_or_default();
    let path = url.path();

    match host {
        GOOGLE_MAPS_API_HOST => !path.starts_with(PLACE_PHOTO_PATH),
        "maps.google.com" | "maps.app.goo.gl" | "maps.gstatic.com" => true,
        "www.google.com" | "google.com" => path.starts_with("/maps"),
        "goo.gl" => path.starts_with("/maps"),
        _ => {
            path.contains("/staticmap")
                || host.starts_with("tile.")
                || host.ends_with(".tile.openstreetmap.org")
        }
    }
}

fn has_image_extension(url: &Url) -> bool {
    url.path()
        .rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Whether `raw` can be shown as a photo
pub fn is_displayable(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw.trim()) else {
        return false;
    };
    if url.scheme() != "https" || is_map_endpoint(&url) {
        return false;
    }

    let host = url.host_str().unwrap_or_default();
    host == GOOGLE_MAPS_API_HOST || IMAGE_HOSTS.contains(&host) || has_image_extension(&url)
}

/// Displayable photos in their original order, without duplicates
pub fn filter_photos(photos: &[String]) -> Vec<String> {
    photos
        .iter()
        .map(|p| p.trim())
        .filter(|p| is_displayable(p))
        .map(str::to_string)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Like [`filter_photos`], but substitutes `fallback` when every reference was rejected.
/// A gem that never had photos stays empty.
pub fn filter_photos_with_fallback(photos: &[String], fallback: &str) -> Vec<String> {
    let filtered = filter_photos(photos);
    if filtered.is_empty() && !photos.is_empty() {
        tracing::debug!(
            rejected = photos.len(),
            "No displayable photos, using fallback image"
        );
        return vec![fallback.to_string()];
    }
    filtered
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoTile {
    pub src: String,
    pub alt: String,
    /// Index into `slides` opened when the tile is clicked
    pub slide_index: usize,
    pub width: u32,
    pub height: u32,
    pub primary: bool,
}

/// Grid of photo tiles plus the full lightbox slide list
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    pub tiles: Vec<PhotoTile>,
    /// Tile showing the first hidden photo under a "+N more" overlay
    #[serde(skip_serializing_if = "Option::is_none")]
    pub more: Option<MoreTile>,
    pub slides: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoreTile {
    pub tile: PhotoTile,
    pub label: String,
}

impl Gallery {
    /// Lay out already filtered photos. An empty input renders the
    /// "No photos available" placeholder.
    pub fn layout(photos: Vec<String>, place_name: &str) -> Self {
        let tiles = photos
            .iter()
            .take(MAX_GALLERY_TILES)
            .enumerate()
            .map(|(i, src)| {
                let size = if i == 0 {
                    PRIMARY_TILE_PX
                } else {
                    SECONDARY_TILE_PX
                };
                PhotoTile {
                    src: src.clone(),
                    alt: format!("{} - Photo {}", place_name, i + 1),
                    slide_index: i,
                    width: size,
                    height: size,
                    primary: i == 0,
                }
            })
            .collect();

        let more = photos.get(MAX_GALLERY_TILES).map(|src| MoreTile {
            tile: PhotoTile {
                src: src.clone(),
                alt: format!("{} - More photos", place_name),
                slide_index: MAX_GALLERY_TILES,
                width: SECONDARY_TILE_PX,
                height: SECONDARY_TILE_PX,
                primary: false,
            },
            label: format!("+{} more", photos.len() - MAX_GALLERY_TILES),
        });

        Self {
            tiles,
            more,
            slides: photos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filters_map_endpoints_and_garbage() {
        let photos = strings(&[
            "https://maps.googleapis.com/x",
            "https://images.unsplash.com/y.jpg",
            "not-a-url",
        ]);
        assert_eq!(
            filter_photos(&photos),
            strings(&["https://images.unsplash.com/y.jpg"])
        );
    }

    #[test]
    fn test_place_photo_api_is_allowed_static_map_is_not() {
        assert!(is_displayable(
            "https://maps.googleapis.com/maps/api/place/photo?maxwidth=800&photo_reference=abc"
        ));
        assert!(!is_displayable(
            "https://maps.googleapis.com/maps/api/staticmap?center=1,2&zoom=14"
        ));
        assert!(!is_displayable("https://maps.google.com/?cid=123"));
        assert!(!is_displayable(
            "https://www.google.com/maps/place/Balangan/@-8.79,115.12,15z"
        ));
        assert!(!is_displayable("https://a.tile.openstreetmap.org/14/1/2.png"));
    }

    #[test]
    fn test_map_marker_icons_are_rejected() {
        assert!(!is_displayable(
            "https://maps.gstatic.com/mapfiles/api-3/images/spotlight-poi2.png"
        ));
        assert!(!is_displayable(
            "https://maps.gstatic.com/mapfiles/place_api/icons/v1/png_71/generic_business-71.png"
        ));
    }

    #[test]
    fn test_requires_https_and_known_host_or_extension() {
        assert!(is_displayable("https://lh3.googleusercontent.com/p/AF1Qip"));
        assert!(is_displayable("https://cdn.example.org/photos/falls.JPEG"));
        assert!(!is_displayable("http://images.unsplash.com/y.jpg"));
        assert!(!is_displayable("https://example.org/page.html"));
        assert!(!is_displayable("ftp://example.org/a.jpg"));
    }

    #[test]
    fn test_deduplicates_preserving_order() {
        let photos = strings(&[
            "https://images.unsplash.com/b.jpg",
            "https://images.unsplash.com/a.jpg",
            " https://images.unsplash.com/b.jpg ",
        ]);
        assert_eq!(
            filter_photos(&photos),
            strings(&[
                "https://images.unsplash.com/b.jpg",
                "https://images.unsplash.com/a.jpg"
            ])
        );
    }

    #[test]
    fn test_fallback_only_when_something_was_rejected() {
        let fallback = "https://images.unsplash.com/fallback.jpg";

        let rejected = strings(&["https://maps.google.com/?cid=1"]);
        assert_eq!(
            filter_photos_with_fallback(&rejected, fallback),
            strings(&[fallback])
        );

        assert!(filter_photos_with_fallback(&[], fallback).is_empty());
    }

    #[test]
    fn test_gallery_layout_with_overflow() {
        let photos: Vec<String> = (0..8)
            .map(|i| format!("https://images.unsplash.com/{}.jpg", i))
            .collect();
        let gallery = Gallery::layout(photos, "Balangan Beach");

        assert_eq!(gallery.tiles.len(), 5);
        assert!(gallery.tiles[0].primary);
        assert_eq!(gallery.tiles[0].width, 600);
        assert_eq!(gallery.tiles[4].alt, "Balangan Beach - Photo 5");

        let more = gallery.more.unwrap();
        assert_eq!(more.label, "+3 more");
        assert_eq!(more.tile.slide_index, 5);
        assert_eq!(gallery.slides.len(), 8);
    }

    #[test]
    fn test_gallery_layout_small() {
        let gallery = Gallery::layout(strings(&["https://images.unsplash.com/a.jpg"]), "Spot");
        assert_eq!(gallery.tiles.len(), 1);
        assert!(gallery.more.is_none());

        assert!(Gallery::layout(Vec::new(), "Spot").is_empty());
    }
}
