use axum::{extract::State, Json};

use super::monitor::StatusSnapshot;
use crate::AppState;

/// Last observed backend status
///
/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.availability.snapshot())
}

/// Probe the backend right now, outside the periodic schedule
///
/// POST /api/status/recheck
pub async fn recheck_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.availability.recheck().await)
}
