//! Common error types for the ESG scoring services

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for ESG scoring operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the ESG scoring services
#[derive(Error, Debug)]
pub enum Error {
    /// A file could not be read
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration parsing or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
