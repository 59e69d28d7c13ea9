//! Artifact store
//!
//! Resolves each [`ArtifactKind`] independently over an ordered list of search
//! directories (first usable file wins), with an optional [`RemoteSource`]
//! consulted whenever a file is missing locally.
//!
//! **Caching:** a successfully loaded handle is kept for the lifetime of the
//! store and later lookups return it without touching the filesystem. Failed
//! resolutions are not remembered; the next lookup scans again.
//!
//! **Concurrency:** loads run outside the lock. Only the final assignment takes
//! the write lock, and the first handle stored for a kind wins, so concurrent
//! first-time lookups may load twice but never expose a partial handle.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{load_artifact, ArtifactError, ArtifactHandle, ArtifactKind, RemoteSource};
use crate::models::{Regressor, Vectorizer};

/// Per-directory file presence report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundFiles {
    pub vectorizer: bool,
    pub esg_model: bool,
    pub sdg_model: bool,
}

/// Store state as reported by `GET /models/status`
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub vectorizer_loaded: bool,
    pub esg_model_loaded: bool,
    pub sdg_model_loaded: bool,
    pub search_paths: Vec<String>,
    pub found_files: BTreeMap<String, FoundFiles>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

/// Lazily loading, memoizing artifact store
pub struct ArtifactStore {
    search_paths: Vec<PathBuf>,
    remote: Option<Arc<dyn RemoteSource>>,
    handles: RwLock<HashMap<ArtifactKind, ArtifactHandle>>,
}

impl ArtifactStore {
    /// Create a store over `search_paths`, in priority order
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            remote: None,
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Enable the remote fallback
    pub fn with_remote(mut self, remote: Arc<dyn RemoteSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Return the handle for `kind`, resolving it if not yet cached
    ///
    /// Never fails: anything that prevents loading is logged and yields `None`.
    pub async fn get(&self, kind: ArtifactKind) -> Option<ArtifactHandle> {
        if let Some(handle) = self.cached(kind).await {
            return Some(handle);
        }

        let handle = self.resolve(kind).await?;
        let mut handles = self.handles.write().await;
        Some(handles.entry(kind).or_insert(handle).clone())
    }

    /// Cached handle for `kind`, without attempting resolution
    pub async fn cached(&self, kind: ArtifactKind) -> Option<ArtifactHandle> {
        self.handles.read().await.get(&kind).cloned()
    }

    pub async fn is_loaded(&self, kind: ArtifactKind) -> bool {
        self.handles.read().await.contains_key(&kind)
    }

    pub async fn vectorizer(&self) -> Option<Arc<dyn Vectorizer>> {
        match self.get(ArtifactKind::Vectorizer).await? {
            ArtifactHandle::Vectorizer(v) => Some(v),
            ArtifactHandle::Regressor(_) => None,
        }
    }

    /// Regressor handle for `kind` (`EsgRegressor` or `SdgRegressor`)
    pub async fn regressor(&self, kind: ArtifactKind) -> Option<Arc<dyn Regressor>> {
        match self.get(kind).await? {
            ArtifactHandle::Regressor(r) => Some(r),
            ArtifactHandle::Vectorizer(_) => None,
        }
    }

    /// Install an externally constructed handle, replacing any cached one
    pub async fn install(
        &self,
        kind: ArtifactKind,
        handle: ArtifactHandle,
    ) -> Result<(), ArtifactError> {
        if !handle.serves(kind) {
            return Err(ArtifactError::KindMismatch(kind));
        }
        info!(artifact = %kind, "Installing artifact handle");
        self.handles.write().await.insert(kind, handle);
        Ok(())
    }

    /// Attempt resolution of every kind; returns how many are loaded
    pub async fn resolve_all(&self) -> usize {
        let mut loaded = 0;
        for kind in ArtifactKind::ALL {
            if self.get(kind).await.is_some() {
                loaded += 1;
            }
        }
        loaded
    }

    /// Resolve all kinds, then report what is loaded and what exists on disk
    pub async fn status(&self) -> StoreStatus {
        self.resolve_all().await;

        let mut found_files = BTreeMap::new();
        for base in &self.search_paths {
            found_files.insert(
                base.display().to_string(),
                FoundFiles {
                    vectorizer: is_file(&base.join(ArtifactKind::Vectorizer.file_name())).await,
                    esg_model: is_file(&base.join(ArtifactKind::EsgRegressor.file_name())).await,
                    sdg_model: is_file(&base.join(ArtifactKind::SdgRegressor.file_name())).await,
                },
            );
        }

        StoreStatus {
            vectorizer_loaded: self.is_loaded(ArtifactKind::Vectorizer).await,
            esg_model_loaded: self.is_loaded(ArtifactKind::EsgRegressor).await,
            sdg_model_loaded: self.is_loaded(ArtifactKind::SdgRegressor).await,
            search_paths: self
                .search_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            found_files,
            remote: self.remote.as_ref().map(|r| r.describe()),
        }
    }

    /// Scan the search paths for a usable artifact file
    async fn resolve(&self, kind: ArtifactKind) -> Option<ArtifactHandle> {
        for base in &self.search_paths {
            let path = base.join(kind.file_name());

            if !is_file(&path).await {
                let Some(remote) = &self.remote else {
                    continue;
                };
                match remote.fetch(kind.file_name(), &path).await {
                    Ok(()) => info!(
                        artifact = %kind,
                        path = %path.display(),
                        "Fetched artifact from {}",
                        remote.describe()
                    ),
                    Err(e) => {
                        debug!(artifact = %kind, error = %e, "Remote fetch failed");
                        continue;
                    }
                }
                if !is_file(&path).await {
                    continue;
                }
            }

            info!(artifact = %kind, path = %path.display(), "Loading artifact");
            match load_artifact(kind, &path).await {
                Ok(handle) => {
                    info!(artifact = %kind, "Artifact loaded: {:?}", handle);
                    return Some(handle);
                }
                Err(e) => {
                    warn!(artifact = %kind, error = %e, "Artifact load failed");
                }
            }
        }

        debug!(
            artifact = %kind,
            "Artifact {} not found in {} search path(s)",
            kind.file_name(),
            self.search_paths.len()
        );
        None
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::remote::write_atomically;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const VECTORIZER_JSON: &str = r#"{"vocabulary": {"solar": 0, "wind": 1}, "idf": [1.0, 1.0]}"#;
    const ESG_JSON: &str =
        r#"{"coefficients": [[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]], "intercepts": [0.0, 0.0, 0.0]}"#;

    fn write(dir: &Path, kind: ArtifactKind, content: &str) {
        std::fs::write(dir.join(kind.file_name()), content).unwrap();
    }

    /// Remote source serving fixed content and counting fetches
    struct FixedRemote {
        content: Option<&'static str>,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl RemoteSource for FixedRemote {
        fn describe(&self) -> String {
            "fixed".to_string()
        }

        async fn fetch(&self, _file_name: &str, dest: &Path) -> Result<(), ArtifactError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match self.content {
                Some(content) => write_atomically(dest, content.as_bytes()).await,
                None => Err(ArtifactError::Remote("404".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_missing_everywhere_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(vec![dir.path().to_path_buf()]);

        assert!(store.get(ArtifactKind::Vectorizer).await.is_none());
        assert!(store.regressor(ArtifactKind::EsgRegressor).await.is_none());
        assert!(!store.is_loaded(ArtifactKind::Vectorizer).await);
    }

    #[tokio::test]
    async fn test_first_search_path_wins_per_artifact() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write(second.path(), ArtifactKind::Vectorizer, VECTORIZER_JSON);
        write(first.path(), ArtifactKind::EsgRegressor, ESG_JSON);
        write(
            second.path(),
            ArtifactKind::EsgRegressor,
            r#"{"coefficients": [[9.0, 9.0]], "intercepts": [9.0]}"#,
        );

        let store =
            ArtifactStore::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);

        assert!(store.vectorizer().await.is_some());
        let esg = store.regressor(ArtifactKind::EsgRegressor).await.unwrap();
        assert_eq!(esg.n_outputs(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_file_falls_through_to_next_path() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write(first.path(), ArtifactKind::Vectorizer, "not json");
        write(second.path(), ArtifactKind::Vectorizer, VECTORIZER_JSON);

        let store =
            ArtifactStore::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        assert!(store.vectorizer().await.is_some());
    }

    #[tokio::test]
    async fn test_unfitted_vectorizer_stays_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            ArtifactKind::Vectorizer,
            r#"{"vocabulary": {"solar": 0}, "idf": null}"#,
        );

        let store = ArtifactStore::new(vec![dir.path().to_path_buf()]);
        assert!(store.vectorizer().await.is_none());
        assert!(!store.is_loaded(ArtifactKind::Vectorizer).await);
    }

    #[tokio::test]
    async fn test_handle_is_cached_after_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ArtifactKind::Vectorizer, VECTORIZER_JSON);

        let store = ArtifactStore::new(vec![dir.path().to_path_buf()]);
        assert!(store.vectorizer().await.is_some());

        // Removing the file does not affect the cached handle
        std::fs::remove_file(dir.path().join(ArtifactKind::Vectorizer.file_name())).unwrap();
        assert!(store.vectorizer().await.is_some());
    }

    #[tokio::test]
    async fn test_failed_resolution_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(vec![dir.path().to_path_buf()]);
        assert!(store.regressor(ArtifactKind::SdgRegressor).await.is_none());

        // Artifact added while the process is running
        write(
            dir.path(),
            ArtifactKind::SdgRegressor,
            r#"{"coefficients": [[0.1, 0.1]], "intercepts": [0.2]}"#,
        );
        assert!(store.regressor(ArtifactKind::SdgRegressor).await.is_some());
    }

    #[tokio::test]
    async fn test_remote_fetch_fills_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FixedRemote {
            content: Some(VECTORIZER_JSON),
            fetches: AtomicUsize::new(0),
        });
        let store = ArtifactStore::new(vec![dir.path().join("models")]).with_remote(remote.clone());

        assert!(store.vectorizer().await.is_some());
        assert!(dir.path().join("models").join("vectorizer.json").exists());

        // Cached: no second fetch
        assert!(store.vectorizer().await.is_some());
        assert_eq!(remote.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let remote = Arc::new(FixedRemote {
            content: None,
            fetches: AtomicUsize::new(0),
        });
        let store = ArtifactStore::new(vec![dir.path().to_path_buf(), dir.path().join("b")])
            .with_remote(remote.clone());

        assert!(store.get(ArtifactKind::EsgRegressor).await.is_none());
        // One attempt per search path
        assert_eq!(remote.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_remote_not_consulted_when_file_present() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ArtifactKind::EsgRegressor, ESG_JSON);
        let remote = Arc::new(FixedRemote {
            content: None,
            fetches: AtomicUsize::new(0),
        });
        let store = ArtifactStore::new(vec![dir.path().to_path_buf()]).with_remote(remote.clone());

        assert!(store.get(ArtifactKind::EsgRegressor).await.is_some());
        assert_eq!(remote.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_install_checks_capability() {
        let store = ArtifactStore::new(Vec::new());
        let regressor: Arc<dyn Regressor> = Arc::new(crate::models::LinearRegressor::new(
            vec![vec![1.0]],
            vec![0.0],
        ));

        let err = store
            .install(ArtifactKind::Vectorizer, ArtifactHandle::Regressor(regressor.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::KindMismatch(ArtifactKind::Vectorizer)));

        store
            .install(ArtifactKind::SdgRegressor, ArtifactHandle::Regressor(regressor))
            .await
            .unwrap();
        assert!(store.is_loaded(ArtifactKind::SdgRegressor).await);
    }

    #[tokio::test]
    async fn test_status_reports_files_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ArtifactKind::Vectorizer, VECTORIZER_JSON);
        write(dir.path(), ArtifactKind::EsgRegressor, ESG_JSON);

        let store = ArtifactStore::new(vec![dir.path().to_path_buf()]);
        let status = store.status().await;

        assert!(status.vectorizer_loaded);
        assert!(status.esg_model_loaded);
        assert!(!status.sdg_model_loaded);
        let found = &status.found_files[&dir.path().display().to_string()];
        assert_eq!(
            found,
            &FoundFiles {
                vectorizer: true,
                esg_model: true,
                sdg_model: false
            }
        );
        assert!(status.remote.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_first_loads_agree() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ArtifactKind::Vectorizer, VECTORIZER_JSON);
        let store = Arc::new(ArtifactStore::new(vec![dir.path().to_path_buf()]));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.vectorizer().await })
            })
            .collect();

        let mut loaded = Vec::new();
        for task in tasks {
            loaded.push(task.await.unwrap().unwrap());
        }

        let cached = store.vectorizer().await.unwrap();
        for handle in loaded {
            assert_eq!(handle.dim(), cached.dim());
        }
    }
}
