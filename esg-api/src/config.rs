//! Configuration resolution for esg-api
//!
//! **Priority:** CLI argument → environment variable → TOML file → compiled default
//!
//! CLI and environment share one tier through clap's `env` support, so a flag
//! always beats its variable. `MODEL_S3_BUCKET` / `MODEL_S3_PREFIX` keep the
//! names existing deployments already set.

use clap::Parser;
use esg_common::config::{CompiledDefaults, TomlConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::artifacts::remote::credentials_from_env;
use crate::artifacts::{ArtifactStore, S3HttpSource};
use tracing::warn;

/// Command-line interface
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "esg-api", version, about = "ESG/SDG score prediction service")]
pub struct Cli {
    /// TOML config file (default: platform config directory)
    #[arg(long, env = "ESG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bind address
    #[arg(long, env = "ESG_HOST")]
    pub host: Option<String>,

    /// HTTP port
    #[arg(long, short, env = "PORT")]
    pub port: Option<u16>,

    /// Model artifact directory; repeat (or comma-separate) for a search list
    #[arg(long = "model-path", env = "ESG_MODEL_PATHS", value_delimiter = ',')]
    pub model_paths: Vec<PathBuf>,

    /// Bucket holding model artifacts missing locally
    #[arg(long, env = "MODEL_S3_BUCKET")]
    pub bucket: Option<String>,

    /// Key prefix inside the bucket
    #[arg(long, env = "MODEL_S3_PREFIX")]
    pub prefix: Option<String>,

    /// Bucket region, used for request signing
    #[arg(long, env = "MODEL_S3_REGION")]
    pub region: Option<String>,

    /// Object storage endpoint URL (path-style; default: regional AWS endpoint)
    #[arg(long, env = "MODEL_S3_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Remote fetch timeout in seconds
    #[arg(long, env = "MODEL_S3_TIMEOUT_SECS")]
    pub remote_timeout_secs: Option<u64>,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "ESG_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Load all model artifacts at startup instead of on first request
    #[arg(long)]
    pub preload: bool,
}

/// Remote artifact source settings
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSettings {
    pub bucket: String,
    pub prefix: String,
    pub region: String,
    pub endpoint: String,
    pub timeout: Duration,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_paths: Vec<PathBuf>,
    pub remote: Option<RemoteSettings>,
    pub log_level: String,
    pub preload: bool,
}

impl ServiceConfig {
    /// Merge CLI/env values over the TOML file over compiled defaults
    pub fn resolve(cli: &Cli, toml: Option<&TomlConfig>) -> Self {
        let defaults = CompiledDefaults::default();
        let file = toml.cloned().unwrap_or_default();
        let file_remote = file.remote.as_ref();

        let model_paths = if !cli.model_paths.is_empty() {
            cli.model_paths.clone()
        } else {
            file.model_paths
                .clone()
                .filter(|paths| !paths.is_empty())
                .unwrap_or_else(|| defaults.model_paths.clone())
        };

        // An empty bucket disables the remote fallback
        let bucket = non_empty(cli.bucket.clone())
            .or_else(|| file_remote.and_then(|r| non_empty(Some(r.bucket.clone()))));

        let remote = bucket.map(|bucket| {
            let region = non_empty(cli.region.clone())
                .or_else(|| file_remote.and_then(|r| non_empty(r.region.clone())))
                .unwrap_or_else(|| defaults.remote_region.clone());
            RemoteSettings {
                bucket,
                prefix: cli
                    .prefix
                    .clone()
                    .or_else(|| file_remote.map(|r| r.prefix.clone()))
                    .unwrap_or_default(),
                endpoint: non_empty(cli.endpoint.clone())
                    .or_else(|| file_remote.and_then(|r| non_empty(r.endpoint.clone())))
                    .unwrap_or_else(|| defaults.remote_endpoint(&region)),
                region,
                timeout: Duration::from_secs(
                    cli.remote_timeout_secs
                        .or_else(|| file_remote.and_then(|r| r.timeout_secs))
                        .unwrap_or(defaults.remote_timeout_secs),
                ),
            }
        });

        Self {
            host: cli.host.clone().or(file.host).unwrap_or(defaults.host),
            port: cli.port.or(file.port).unwrap_or(defaults.port),
            model_paths,
            remote,
            log_level: non_empty(cli.log_level.clone())
                .or_else(|| non_empty(file.logging.level.clone()))
                .unwrap_or(defaults.log_level),
            preload: cli.preload,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the artifact store described by this configuration
    ///
    /// Remote requests are signed with the standard AWS credential variables
    /// when they are set.
    pub fn build_artifact_store(&self) -> esg_common::Result<ArtifactStore> {
        let store = ArtifactStore::new(self.model_paths.clone());
        match &self.remote {
            None => Ok(store),
            Some(remote) => {
                let source = S3HttpSource::new(
                    &remote.endpoint,
                    &remote.bucket,
                    &remote.region,
                    &remote.prefix,
                    credentials_from_env(),
                    remote.timeout,
                )
                .map_err(|e| esg_common::Error::Config(e.to_string()))?;
                if !source.is_signed() {
                    warn!("No AWS credentials in the environment, remote fetches are anonymous");
                }
                Ok(store.with_remote(Arc::new(source)))
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
