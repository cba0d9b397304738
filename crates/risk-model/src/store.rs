//! Compute-Once Artifact Store

use crate::classifier::Classifier;
use crate::document::ArtifactDocument;
use crate::scaler::Scaler;
use crate::ArtifactError;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, info};

/// Fitted scaler and classifier pair, read-only once loaded
#[derive(Debug)]
pub struct ScoringArtifacts {
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
}

impl ScoringArtifacts {
    pub fn new(scaler: Box<dyn Scaler>, classifier: Box<dyn Classifier>) -> Self {
        Self { scaler, classifier }
    }

    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

/// Source of scoring artifacts
pub trait ArtifactLoader: Send + Sync {
    fn load(&self, classifier: &Path, scaler: &Path) -> Result<ScoringArtifacts, ArtifactError>;
}

/// Reads both artifacts from JSON interchange documents on disk
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonArtifactLoader;

impl JsonArtifactLoader {
    fn read(path: &Path) -> Result<ArtifactDocument, ArtifactError> {
        let text = std::fs::read_to_string(path).map_err(|e| ArtifactError::load(path, e.to_string()))?;
        ArtifactDocument::from_json(&text).map_err(|e| ArtifactError::load(path, e))
    }
}

impl ArtifactLoader for JsonArtifactLoader {
    fn load(&self, classifier: &Path, scaler: &Path) -> Result<ScoringArtifacts, ArtifactError> {
        debug!(
            "Reading artifacts: classifier={}, scaler={}",
            classifier.display(),
            scaler.display()
        );

        let classifier_doc = Self::read(classifier)?;
        let scaler_doc = Self::read(scaler)?;

        let classifier_model = classifier_doc
            .into_classifier()
            .map_err(|e| ArtifactError::contract(classifier, e))?;
        let scaler_model = scaler_doc
            .into_scaler()
            .map_err(|e| ArtifactError::contract(scaler, e))?;

        Ok(ScoringArtifacts::new(scaler_model, classifier_model))
    }
}

/// Loads artifacts once and hands the same instance to every caller.
///
/// The first successful load wins; later calls return it regardless of the
/// paths they pass. Failed loads are not cached.
pub struct ArtifactStore {
    loader: Box<dyn ArtifactLoader>,
    artifacts: OnceLock<Arc<ScoringArtifacts>>,
    init: Mutex<()>,
    loads: AtomicUsize,
}

impl ArtifactStore {
    /// Store backed by the JSON file loader
    pub fn new() -> Self {
        Self::with_loader(JsonArtifactLoader)
    }

    /// Store backed by a custom loader
    pub fn with_loader(loader: impl ArtifactLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            artifacts: OnceLock::new(),
            init: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Return the cached artifacts, loading them on first use
    pub fn load(&self, classifier: &Path, scaler: &Path) -> Result<Arc<ScoringArtifacts>, ArtifactError> {
        if let Some(artifacts) = self.artifacts.get() {
            return Ok(Arc::clone(artifacts));
        }

        // the guard holds only (), so a poisoned lock carries no broken state
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(artifacts) = self.artifacts.get() {
            return Ok(Arc::clone(artifacts));
        }

        self.loads.fetch_add(1, Ordering::SeqCst);
        let loaded = Arc::new(self.loader.load(classifier, scaler)?);
        info!(
            "Artifacts loaded: scaler={}, classifier={}",
            loaded.scaler().kind(),
            loaded.classifier().kind()
        );

        Ok(Arc::clone(self.artifacts.get_or_init(|| loaded)))
    }

    /// Cached artifacts, if a load has succeeded
    pub fn get(&self) -> Option<Arc<ScoringArtifacts>> {
        self.artifacts.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.get().is_some()
    }

    /// Number of times the underlying loader has been invoked
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LogisticRegression;
    use crate::scaler::StandardScaler;
    use feature_schema::FEATURE_DIMENSION;
    use std::path::PathBuf;
    use std::sync::Barrier;
    use std::time::Duration;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
    }

    /// Counts invocations and sleeps so concurrent callers pile up on the lock
    struct SlowLoader {
        calls: Arc<AtomicUsize>,
    }

    impl ArtifactLoader for SlowLoader {
        fn load(&self, _: &Path, _: &Path) -> Result<ScoringArtifacts, ArtifactError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(ScoringArtifacts::new(
                Box::new(StandardScaler::new(vec![0.0; FEATURE_DIMENSION], vec![1.0; FEATURE_DIMENSION]).unwrap()),
                Box::new(LogisticRegression::new(vec![0.0; FEATURE_DIMENSION], 0.0).unwrap()),
            ))
        }
    }

    struct FailingLoader;

    impl ArtifactLoader for FailingLoader {
        fn load(&self, classifier: &Path, _: &Path) -> Result<ScoringArtifacts, ArtifactError> {
            Err(ArtifactError::load(classifier, "unreadable"))
        }
    }

    #[test]
    fn test_loads_fixtures() {
        let store = ArtifactStore::new();
        let artifacts = store
            .load(&fixture("classifier.json"), &fixture("scaler.json"))
            .unwrap();
        assert_eq!(artifacts.scaler().kind(), "standard_scaler");
        assert_eq!(artifacts.classifier().kind(), "extra_trees");
        assert!(store.is_loaded());
    }

    #[test]
    fn test_second_load_ignores_arguments() {
        let store = ArtifactStore::new();
        let first = store
            .load(&fixture("classifier.json"), &fixture("scaler.json"))
            .unwrap();
        let second = store
            .load(Path::new("/nonexistent/a.json"), Path::new("/nonexistent/b.json"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn test_concurrent_first_calls_load_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = Arc::new(ArtifactStore::with_loader(SlowLoader {
            calls: Arc::clone(&calls),
        }));
        let callers = 8;
        let barrier = Arc::new(Barrier::new(callers));

        let handles: Vec<_> = (0..callers)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    store.load(Path::new("c.json"), Path::new("s.json")).unwrap()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.load_count(), 1);
        for artifacts in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], artifacts));
        }
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let store = ArtifactStore::new();
        let err = store
            .load(Path::new("/nonexistent/best_model.json"), &fixture("scaler.json"))
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Load { .. }));
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_failed_load_not_cached() {
        let store = ArtifactStore::with_loader(FailingLoader);
        assert!(store.load(Path::new("c"), Path::new("s")).is_err());
        assert!(store.load(Path::new("c"), Path::new("s")).is_err());
        assert_eq!(store.load_count(), 2);
        assert!(store.get().is_none());
    }

    #[test]
    fn test_swapped_files_are_contract_errors() {
        let store = ArtifactStore::new();
        let err = store
            .load(&fixture("scaler.json"), &fixture("classifier.json"))
            .unwrap_err();
        match err {
            ArtifactError::Contract { path, reason } => {
                assert_eq!(path, fixture("scaler.json"));
                assert!(reason.contains("predict_probability"));
            }
            other => panic!("expected contract error, got {other}"),
        }
    }

    #[test]
    fn test_corrupt_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_model.json");
        std::fs::write(&path, b"\x80\x04\x95pickled").unwrap();

        let err = ArtifactStore::new()
            .load(&path, &fixture("scaler.json"))
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Load { .. }));
    }

    #[test]
    fn test_wrong_dimension_is_contract_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        let doc = serde_json::json!({
            "kind": "standard_scaler",
            "format_version": 1,
            "mean": vec![0.0; 27],
            "scale": vec![1.0; 27],
        });
        std::fs::write(&path, doc.to_string()).unwrap();

        let err = ArtifactStore::new()
            .load(&fixture("classifier.json"), &path)
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Contract { .. }));
    }
}
