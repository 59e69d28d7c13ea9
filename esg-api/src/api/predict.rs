//! Score prediction endpoint
//!
//! The body is parsed as JSON whatever the Content-Type header says, so bare
//! `curl -d` requests work.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::services::ComposedResponse;
use crate::AppState;

/// Score scale guidance attached to every prediction
#[derive(Debug, Clone, Serialize)]
pub struct Interpretation {
    pub scale: &'static str,
    pub score_levels: ScoreLevels,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreLevels {
    pub high: &'static str,
    pub medium: &'static str,
    pub low: &'static str,
}

impl Default for Interpretation {
    fn default() -> Self {
        Self {
            scale: "Scores range from 0 to 1, where 1 indicates strongest alignment",
            score_levels: ScoreLevels {
                high: "0.7 - 1.0",
                medium: "0.4 - 0.69",
                low: "0 - 0.39",
            },
        }
    }
}

/// POST /predict response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub composed: ComposedResponse,
    pub interpretation: Interpretation,
}

/// Extract the `description` string from a request body
pub fn parse_description(body: &[u8]) -> ApiResult<String> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Request body must be JSON: {}", e)))?;

    match value.get("description") {
        Some(Value::String(description)) => Ok(description.clone()),
        Some(_) => Err(ApiError::BadRequest(
            "Field 'description' must be a string".to_string(),
        )),
        None => Err(ApiError::BadRequest(
            "Missing required field: description".to_string(),
        )),
    }
}

/// POST /predict
pub async fn predict(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<PredictResponse>> {
    let description = parse_description(&body)?;
    debug!(length = description.len(), "Scoring description");

    let composed = state.composer.compose(&description).await;

    Ok(Json(PredictResponse {
        composed,
        interpretation: Interpretation::default(),
    }))
}

pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}
