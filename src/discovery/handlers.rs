use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::Instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use super::client::DiscoveryError;
use super::models::DiscoveryResponse;
use super::session::{SearchTicket, SearchView};
use super::validation::{QueryValidationError, SearchQuery};
use crate::presentation::ResultsView;
use crate::AppState;

/// Incoming search body. `searchQuery` is optional here so a missing field
/// gets the same 400 as a blank one.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchBody {
    #[serde(rename = "searchQuery", default)]
    pub search_query: Option<String>,
}

fn parse_body(body: Result<Json<SearchBody>, JsonRejection>) -> Result<SearchQuery, DiscoveryError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::warn!(error = %rejection, "Unreadable search body");
        QueryValidationError::Missing
    })?;
    Ok(SearchQuery::parse_field(body.search_query.as_deref())?)
}

async fn forward(state: &AppState, query: &SearchQuery) -> Result<DiscoveryResponse, DiscoveryError> {
    let span = tracing::info_span!("discover", request_id = %Uuid::new_v4());
    state
        .discovery_client
        .discover_validated(query)
        .instrument(span)
        .await
}

/// Forward a search to the backend and return its response unchanged
///
/// POST /api/discover
pub async fn discover(
    State(state): State<AppState>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<DiscoveryResponse>, DiscoveryError> {
    let query = parse_body(body)?;
    let response = forward(&state, &query).await?;
    Ok(Json(response))
}

/// Forward a search and return render-ready cards
///
/// POST /api/discover/cards
pub async fn discover_cards(
    State(state): State<AppState>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<ResultsView>, DiscoveryError> {
    let query = parse_body(body)?;
    let response = forward(&state, &query).await?;
    Ok(Json(ResultsView::from_response(
        &response,
        &state.config.fallback_photo_url,
    )))
}

/// Start a search for the shared search view; poll `GET /api/search` for the result
///
/// POST /api/search
pub async fn start_search(
    State(state): State<AppState>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Result<(StatusCode, Json<SearchTicket>), DiscoveryError> {
    let query = parse_body(body)?;
    let ticket = state
        .search_session
        .spawn_search(state.discovery_client.clone(), query);
    Ok((StatusCode::ACCEPTED, Json(ticket)))
}

/// Current state of the search view
///
/// GET /api/search
pub async fn get_search(State(state): State<AppState>) -> Json<SearchView> {
    Json(state.search_session.current())
}

/// Clear the search view ("search again")
///
/// DELETE /api/search
pub async fn reset_search(State(state): State<AppState>) -> StatusCode {
    state.search_session.reset();
    StatusCode::NO_CONTENT
}
