use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
    BoxError, Json, Router,
};
use serde::Serialize;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::availability::handlers as availability_handlers;
use crate::discovery::handlers as discovery_handlers;
use crate::openapi::swagger_ui;
use crate::AppState;

/// Headroom on top of the discovery timeout before the server gives up on a request
const REQUEST_TIMEOUT_HEADROOM_SECS: u64 = 30;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handle request timeout errors
async fn handle_timeout_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal error: {}", err),
        )
    }
}

/// Build the discovery routes
fn discovery_routes() -> Router<AppState> {
    Router::new()
        .route("/discover", post(discovery_handlers::discover))
        .route("/discover/cards", post(discovery_handlers::discover_cards))
        .route(
            "/search",
            get(discovery_handlers::get_search)
                .post(discovery_handlers::start_search)
                .delete(discovery_handlers::reset_search),
        )
}

/// Build the backend status routes
fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(availability_handlers::get_status))
        .route(
            "/status/recheck",
            post(availability_handlers::recheck_status),
        )
}

/// Build the complete application router
pub fn build_router(state: AppState) -> Router {
    let request_timeout =
        state.config.discovery_timeout() + Duration::from_secs(REQUEST_TIMEOUT_HEADROOM_SECS);

    Router::new()
        // Health check at root level
        .route("/", get(health))
        .route("/health", get(health))
        .nest("/api", discovery_routes().merge(status_routes()))
        // Swagger UI for API documentation
        .merge(swagger_ui())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .timeout(request_timeout),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
