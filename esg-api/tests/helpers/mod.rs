//! Shared test helpers: artifact fixtures and request plumbing

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use esg_api::artifacts::{ArtifactKind, ArtifactStore};
use esg_api::models::{LinearRegressor, TfidfVectorizer};
use esg_api::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt;

/// Vocabulary of the fixture vectorizer, in feature-index order
pub const VOCABULARY: [&str; 4] = ["solar", "community", "governance", "water"];

pub const SDG_GOALS: usize = 17;

pub fn fixture_vectorizer() -> TfidfVectorizer {
    let vocabulary = VOCABULARY
        .iter()
        .enumerate()
        .map(|(i, term)| (term.to_string(), i))
        .collect();
    TfidfVectorizer::new(vocabulary, vec![1.0; VOCABULARY.len()])
}

/// "solar" alone predicts Environment 0.9, Social 0.1, Governance 0.1
pub fn fixture_esg_regressor() -> LinearRegressor {
    LinearRegressor::new(
        vec![
            vec![0.8, 0.0, 0.0, 0.2],
            vec![0.0, 0.7, 0.0, 0.0],
            vec![0.0, 0.0, 0.6, 0.0],
        ],
        vec![0.1, 0.1, 0.1],
    )
}

/// Constant SDG model: SDG{n} = n / 100
pub fn fixture_sdg_regressor() -> LinearRegressor {
    LinearRegressor::new(
        vec![vec![0.0; VOCABULARY.len()]; SDG_GOALS],
        (1..=SDG_GOALS).map(|n| n as f64 / 100.0).collect(),
    )
}

pub fn write_artifact<T: serde::Serialize>(dir: &Path, kind: ArtifactKind, artifact: &T) -> PathBuf {
    let path = dir.join(kind.file_name());
    std::fs::write(&path, serde_json::to_vec(artifact).unwrap()).unwrap();
    path
}

pub fn write_vectorizer(dir: &Path) {
    write_artifact(dir, ArtifactKind::Vectorizer, &fixture_vectorizer());
}

pub fn write_esg(dir: &Path) {
    write_artifact(dir, ArtifactKind::EsgRegressor, &fixture_esg_regressor());
}

pub fn write_sdg(dir: &Path) {
    write_artifact(dir, ArtifactKind::SdgRegressor, &fixture_sdg_regressor());
}

pub fn write_all_artifacts(dir: &Path) {
    write_vectorizer(dir);
    write_esg(dir);
    write_sdg(dir);
}

/// App over a single model directory
pub fn app_for_dir(dir: &Path) -> Router {
    app_for_store(Arc::new(ArtifactStore::new(vec![dir.to_path_buf()])))
}

pub fn app_for_store(store: Arc<ArtifactStore>) -> Router {
    build_router(AppState::new(store))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body))
        .unwrap()
}

/// Send one request and decode the JSON response
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn predict(app: &Router, description: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json("/predict", &serde_json::json!({ "description": description })),
    )
    .await
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
