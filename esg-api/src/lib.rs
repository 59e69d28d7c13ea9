//! esg-api library interface
//!
//! Keyword-weighted ESG scoring with an optional learned ESG/SDG model path,
//! served over HTTP. Exposes the router and scoring core for integration
//! testing.

pub mod api;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod models;
pub mod scoring;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::response::{IntoResponse, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::artifacts::ArtifactStore;
use crate::scoring::KeywordScorer;
use crate::services::{ModelPredictor, ScoreComposer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Heuristic + model score composition
    pub composer: ScoreComposer,
    /// Model artifacts, loaded lazily and kept for the process lifetime
    pub store: Arc<ArtifactStore>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        let predictor = ModelPredictor::new(store.clone());
        Self {
            composer: ScoreComposer::new(KeywordScorer::default(), predictor),
            store,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::home_routes())
        .merge(api::predict_routes())
        .merge(api::model_routes())
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Convert a handler panic into the generic internal error response
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unexpected failure".to_string()
    };
    tracing::error!(error = %message, "Request handler panicked");
    ApiError::Internal(message).into_response()
}
