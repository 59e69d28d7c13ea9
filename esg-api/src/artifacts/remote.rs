//! Remote artifact source
//!
//! Used by the artifact store to pull a missing artifact into its expected
//! local location. Failures are reported to the caller, which treats them as
//! "not present".

use async_trait::async_trait;
use reqwest::Url;
use rusty_s3::{Bucket, Credentials, S3Action, UrlStyle};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::ArtifactError;

const USER_AGENT: &str = concat!("esg-api/", env!("CARGO_PKG_VERSION"));

/// Lifetime of a presigned GET URL; each fetch signs a fresh one
const PRESIGN_TTL: Duration = Duration::from_secs(300);

/// Source that can download an artifact file by name
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Human-readable location, for logs
    fn describe(&self) -> String;

    /// Download `file_name` to `dest`. `dest` is either fully written or untouched.
    async fn fetch(&self, file_name: &str, dest: &Path) -> Result<(), ArtifactError>;
}

/// S3-compatible bucket read through SigV4 presigned GET URLs (path-style)
///
/// With credentials every request is signed, so private buckets work. Without
/// them the URL is left unsigned and the bucket must allow anonymous reads.
pub struct S3HttpSource {
    http_client: reqwest::Client,
    bucket: Bucket,
    prefix: String,
    credentials: Option<Credentials>,
}

impl S3HttpSource {
    pub fn new(
        endpoint: &str,
        bucket: &str,
        region: &str,
        prefix: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, ArtifactError> {
        let endpoint_url: Url = endpoint
            .parse()
            .map_err(|e| ArtifactError::Remote(format!("invalid endpoint {}: {}", endpoint, e)))?;
        let bucket = Bucket::new(
            endpoint_url,
            UrlStyle::Path,
            bucket.to_string(),
            region.to_string(),
        )
        .map_err(|e| ArtifactError::Remote(e.to_string()))?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ArtifactError::Remote(e.to_string()))?;

        Ok(Self {
            http_client,
            bucket,
            prefix: prefix.trim_matches('/').to_string(),
            credentials,
        })
    }

    pub fn is_signed(&self) -> bool {
        self.credentials.is_some()
    }

    /// Object key for an artifact file: `<prefix>/<file>`, or `<file>` without a prefix
    pub fn object_key(&self, file_name: &str) -> String {
        if self.prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.prefix, file_name)
        }
    }

    /// GET URL for an artifact file, presigned when credentials are present
    pub fn object_url(&self, file_name: &str) -> Url {
        let key = self.object_key(file_name);
        self.bucket
            .get_object(self.credentials.as_ref(), &key)
            .sign(PRESIGN_TTL)
    }
}

/// Standard AWS credential variables
///
/// Reads `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and the optional
/// `AWS_SESSION_TOKEN`. `None` means anonymous access.
pub fn credentials_from_env() -> Option<Credentials> {
    Credentials::from_env()
}

#[async_trait]
impl RemoteSource for S3HttpSource {
    fn describe(&self) -> String {
        format!(
            "s3://{}/{} ({})",
            self.bucket.name(),
            self.prefix,
            if self.is_signed() { "signed" } else { "anonymous" }
        )
    }

    async fn fetch(&self, file_name: &str, dest: &Path) -> Result<(), ArtifactError> {
        let url = self.object_url(file_name);
        debug!(key = %self.object_key(file_name), "Fetching remote artifact");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ArtifactError::Remote(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArtifactError::Remote(format!(
                "{} returned {}",
                self.object_key(file_name),
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ArtifactError::Remote(e.without_url().to_string()))?;

        write_atomically(dest, &bytes).await
    }
}

/// Write to a sibling temp file, then rename over `dest`
pub async fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    let io_err = |source: std::io::Error| ArtifactError::Io {
        path: dest.to_path_buf(),
        source,
    };

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dest.with_file_name(format!(".{}.{}.part", file_name, Uuid::new_v4()));

    if let Err(source) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(source));
    }
    if let Err(source) = tokio::fs::rename(&tmp, dest).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(source));
    }
    Ok(())
}
