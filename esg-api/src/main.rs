//! esg-api - ESG/SDG score prediction service
//!
//! Serves keyword-based ESG scores for project descriptions, enriched with
//! model-based ESG and SDG predictions whenever the model artifacts can be
//! found locally or fetched from the configured bucket.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use esg_api::config::{Cli, ServiceConfig};
use esg_api::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let toml_config = esg_common::config::load_optional_config(cli.config.as_deref())?;
    let config = ServiceConfig::resolve(&cli, toml_config.as_ref());

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        "Starting ESG Score Predictor (esg-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Model search paths: {:?}", config.model_paths);
    match &config.remote {
        Some(remote) => info!(
            "Remote artifact fallback: bucket={} prefix={:?} region={} endpoint={}",
            remote.bucket, remote.prefix, remote.region, remote.endpoint
        ),
        None => info!("Remote artifact fallback disabled"),
    }

    let store = Arc::new(config.build_artifact_store()?);
    if config.preload {
        let loaded = store.resolve_all().await;
        info!("Preloaded {} of 3 model artifacts", loaded);
    }

    let state = AppState::new(store);
    let app = build_router(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
