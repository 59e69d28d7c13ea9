//! Bootstrap configuration loading
//!
//! Configuration is resolved in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! Tiers 1 and 2 are handled by each service's CLI layer. This module owns
//! the TOML schema, config file discovery, and the compiled defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Application directory name under the platform config directory
pub const APP_DIR_NAME: &str = "esg-scorer";

/// Config file name looked up in the platform config directories
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Bootstrap configuration loaded from a TOML file
///
/// Every field is optional. Anything left unset falls through to
/// [`CompiledDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Bind address for the HTTP server
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Ordered model artifact search directories (first match wins)
    #[serde(default)]
    pub model_paths: Option<Vec<PathBuf>>,

    /// Remote object storage used when an artifact is missing locally
    #[serde(default)]
    pub remote: Option<RemoteConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote artifact source (S3-compatible bucket)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteConfig {
    /// Bucket name
    pub bucket: String,

    /// Key prefix prepended to artifact file names (may be empty)
    #[serde(default)]
    pub prefix: String,

    /// Bucket region, used for request signing
    #[serde(default)]
    pub region: Option<String>,

    /// Base endpoint URL, path-style addressing (`<endpoint>/<bucket>/<key>`)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Per-fetch timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

/// Compiled default values used when no other source provides a setting
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub host: String,
    pub port: u16,
    pub model_paths: Vec<PathBuf>,
    pub remote_region: String,
    pub remote_timeout_secs: u64,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            model_paths: vec![PathBuf::from("models"), PathBuf::from(".")],
            remote_region: "us-east-1".to_string(),
            remote_timeout_secs: 10,
            log_level: "info".to_string(),
        }
    }
}

impl CompiledDefaults {
    /// Regional AWS S3 endpoint, used when no endpoint is configured
    pub fn remote_endpoint(&self, region: &str) -> String {
        format!("https://s3.{}.amazonaws.com", region)
    }
}

/// Parse a TOML config file
///
/// A missing file is an error here; use [`load_optional_config`] for the
/// graceful variant.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Parse TOML config content
pub fn parse_toml_config(content: &str) -> std::result::Result<TomlConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load the config file if one can be found
///
/// An explicitly requested path must exist. Without one, the platform
/// locations are searched and a missing file yields `Ok(None)`.
pub fn load_optional_config(explicit: Option<&Path>) -> Result<Option<TomlConfig>> {
    if let Some(path) = explicit {
        info!("Loading config from {}", path.display());
        return load_toml_config(path).map(Some);
    }

    match locate_config_file() {
        Some(path) => {
            info!("Loading config from {}", path.display());
            load_toml_config(&path).map(Some)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(None)
        }
    }
}

/// Find the first existing config file in the platform locations
///
/// Linux: `~/.config/esg-scorer/config.toml`, then `/etc/esg-scorer/config.toml`.
/// Other platforms: the user config directory only.
pub fn locate_config_file() -> Option<PathBuf> {
    candidate_config_paths().into_iter().find(|p| p.exists())
}

fn candidate_config_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc").join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    candidates
}
