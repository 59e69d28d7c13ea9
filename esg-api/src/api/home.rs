//! API documentation at the service root

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

/// GET /
pub async fn home() -> Json<Value> {
    Json(json!({
        "message": "Welcome to ESG Score Predictor API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/predict": {
                "method": "POST",
                "description": "Get ESG scores for a project description",
                "request_format": {
                    "description": "string (project description)"
                },
                "response_format": {
                    "input": {"description": "string"},
                    "scores": {
                        "Environmental": "float (0-1)",
                        "Social": "float (0-1)",
                        "Governance": "float (0-1)"
                    },
                    "overall_score": "float (0-1), mean of the keyword-based scores",
                    "details": {
                        "Environmental": ["matched terms"],
                        "Social": ["matched terms"],
                        "Governance": ["matched terms"]
                    },
                    "model_scores": "model-based ESG predictions, null if models unavailable",
                    "sdgs": "model-based SDG predictions, {} if the SDG model is unavailable"
                },
                "example_request": {
                    "description": "Solar power installation with community training program and transparent governance"
                }
            },
            "/models/status": {
                "method": "GET",
                "description": "Show which model artifacts are loaded and where they were found"
            },
            "/health": {
                "method": "GET",
                "description": "Check API health status"
            }
        }
    }))
}

pub fn home_routes() -> Router<AppState> {
    Router::new().route("/", get(home))
}
