use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::availability::{BackendStatus, StatusSnapshot};
use crate::discovery::handlers::SearchBody;
use crate::discovery::{
    Analysis, BackendErrorBody, Coordinates, DiscoveryRequest, DiscoveryResponse, ErrorKind,
    HiddenGem, SearchOutcome, SearchTicket, SearchView, WeatherInfo,
};
use crate::error::ErrorResponse;
use crate::presentation::{
    Gallery, GemCard, Insights, MapEmbed, MoreTile, PhotoTile, ResultsView, WeatherPanel,
};

/// OpenAPI documentation for the gemfinder API
///
/// Schema documentation only; handlers are not annotated with paths.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "gemfinder API",
        version = "1.0.0",
        description = "Search for hidden travel gems: forwards natural-language queries to the discovery backend, renders the results and reports backend availability.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    tags(
        (name = "discovery", description = "Hidden gem searches"),
        (name = "status", description = "Discovery backend availability")
    ),
    components(
        schemas(
            ErrorResponse,
            BackendErrorBody,
            SearchBody,
            DiscoveryRequest,
            DiscoveryResponse,
            HiddenGem,
            Coordinates,
            Analysis,
            WeatherInfo,
            ErrorKind,
            SearchTicket,
            SearchOutcome,
            SearchView,
            ResultsView,
            GemCard,
            Gallery,
            PhotoTile,
            MoreTile,
            MapEmbed,
            Insights,
            WeatherPanel,
            BackendStatus,
            StatusSnapshot,
        )
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_registered() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.unwrap().schemas;
        for name in ["DiscoveryResponse", "HiddenGem", "SearchView", "StatusSnapshot"] {
            assert!(schemas.contains_key(name), "missing schema {}", name);
        }
    }
}
