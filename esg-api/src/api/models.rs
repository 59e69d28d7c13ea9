//! Model artifact status endpoint

use axum::{extract::State, routing::get, Json, Router};

use crate::artifacts::StoreStatus;
use crate::AppState;

/// GET /models/status
///
/// Attempts to resolve every artifact first, so a newly deployed file shows
/// up as loaded.
pub async fn models_status(State(state): State<AppState>) -> Json<StoreStatus> {
    Json(state.store.status().await)
}

pub fn model_routes() -> Router<AppState> {
    Router::new().route("/models/status", get(models_status))
}
