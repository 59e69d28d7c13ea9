//! Model artifact resolution and loading
//!
//! Artifacts are JSON files looked up by well-known name under an ordered list
//! of directories, with an optional remote bucket as fallback. See
//! [`store::ArtifactStore`] for the resolution policy.

pub mod remote;
pub mod store;

pub use remote::{RemoteSource, S3HttpSource};
pub use store::{ArtifactStore, FoundFiles, StoreStatus};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::models::{LinearRegressor, ModelError, Regressor, TfidfVectorizer, Vectorizer};

/// Named artifact consumed by the model predictor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Vectorizer,
    EsgRegressor,
    SdgRegressor,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Vectorizer,
        ArtifactKind::EsgRegressor,
        ArtifactKind::SdgRegressor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::Vectorizer => "vectorizer",
            ArtifactKind::EsgRegressor => "esg_regressor",
            ArtifactKind::SdgRegressor => "sdg_regressor",
        }
    }

    /// File name looked up in each search directory (and remote prefix)
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Vectorizer => "vectorizer.json",
            ArtifactKind::EsgRegressor => "esg_regression.json",
            ArtifactKind::SdgRegressor => "sdg_regression.json",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Loaded artifact, exposed through its capability
#[derive(Clone)]
pub enum ArtifactHandle {
    Vectorizer(Arc<dyn Vectorizer>),
    Regressor(Arc<dyn Regressor>),
}

impl ArtifactHandle {
    /// Whether this handle can serve `kind`
    pub fn serves(&self, kind: ArtifactKind) -> bool {
        matches!(
            (self, kind),
            (ArtifactHandle::Vectorizer(_), ArtifactKind::Vectorizer)
                | (ArtifactHandle::Regressor(_), ArtifactKind::EsgRegressor)
                | (ArtifactHandle::Regressor(_), ArtifactKind::SdgRegressor)
        )
    }
}

impl fmt::Debug for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactHandle::Vectorizer(v) => f
                .debug_struct("Vectorizer")
                .field("dim", &v.dim())
                .finish(),
            ArtifactHandle::Regressor(r) => f
                .debug_struct("Regressor")
                .field("n_features", &r.n_features())
                .field("n_outputs", &r.n_outputs())
                .finish(),
        }
    }
}

/// Reasons an artifact could not be made available
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unusable artifact {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error("Remote fetch failed: {0}")]
    Remote(String),

    #[error("Handle does not provide the {0} capability")]
    KindMismatch(ArtifactKind),
}

/// Read, deserialize and validate one artifact file
pub async fn load_artifact(kind: ArtifactKind, path: &Path) -> Result<ArtifactHandle, ArtifactError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_artifact(kind, path, &bytes)
}

fn decode_artifact(
    kind: ArtifactKind,
    path: &Path,
    bytes: &[u8],
) -> Result<ArtifactHandle, ArtifactError> {
    let parse_err = |source: serde_json::Error| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let invalid = |source: ModelError| ArtifactError::Invalid {
        path: path.to_path_buf(),
        source,
    };

    match kind {
        ArtifactKind::Vectorizer => {
            let vectorizer: TfidfVectorizer = serde_json::from_slice(bytes).map_err(parse_err)?;
            vectorizer.validate().map_err(invalid)?;
            Ok(ArtifactHandle::Vectorizer(Arc::new(vectorizer)))
        }
        ArtifactKind::EsgRegressor | ArtifactKind::SdgRegressor => {
            let regressor: LinearRegressor = serde_json::from_slice(bytes).map_err(parse_err)?;
            regressor.validate().map_err(invalid)?;
            Ok(ArtifactHandle::Regressor(Arc::new(regressor)))
        }
    }
}
