//! Score composer
//!
//! Builds the `/predict` payload: heuristic scores are always computed first,
//! then the model path is attempted. Whatever happens on the model path,
//! including a panic inside a model implementation, the request still gets
//! the heuristic scores plus availability notes.

use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

use super::predictor::{
    panic_message, EsgVector, ModelPredictor, Outcome, Prediction, SdgVector, Unavailable,
};
use crate::scoring::{KeywordScorer, PerCategory};

pub const MODEL_UNAVAILABLE_NOTE: &str =
    "Model-based ESG predictions are currently unavailable. Showing keyword-based scores only.";

pub const SDG_UNAVAILABLE_NOTE: &str = "SDG model predictions are currently unavailable. \
     The SDG model may not be loaded or may have encountered an error.";

/// Echo of the scored input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputEcho {
    pub description: String,
}

/// Unified heuristic + model response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedResponse {
    pub input: InputEcho,
    pub scores: PerCategory<f64>,
    pub overall_score: f64,
    pub details: PerCategory<Vec<String>>,
    /// `null` when the ESG model path is unavailable
    pub model_scores: Option<EsgVector>,
    /// `{}` when the SDG model path is unavailable
    pub sdgs: SdgVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdg_note: Option<String>,
}

/// Merges keyword scoring with the optional model path
#[derive(Clone)]
pub struct ScoreComposer {
    scorer: KeywordScorer,
    predictor: ModelPredictor,
}

impl ScoreComposer {
    pub fn new(scorer: KeywordScorer, predictor: ModelPredictor) -> Self {
        Self { scorer, predictor }
    }

    pub async fn compose(&self, description: &str) -> ComposedResponse {
        let heuristic = self.scorer.score(description);
        let overall_score = heuristic.overall();

        let prediction = match AssertUnwindSafe(self.predictor.predict(description))
            .catch_unwind()
            .await
        {
            Ok(prediction) => prediction,
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                warn!(error = %msg, "Model prediction panicked, using keyword-based scores only");
                Prediction::unavailable(Unavailable::Internal(msg))
            }
        };
        log_unavailable(&prediction);

        let model_scores = prediction.esg.into_option();
        let sdgs = prediction.sdg.into_option().unwrap_or_default();

        ComposedResponse {
            input: InputEcho {
                description: description.to_string(),
            },
            scores: heuristic.scores,
            overall_score,
            details: heuristic.details,
            note: model_scores
                .is_none()
                .then(|| MODEL_UNAVAILABLE_NOTE.to_string()),
            sdg_note: sdgs.is_empty().then(|| SDG_UNAVAILABLE_NOTE.to_string()),
            model_scores,
            sdgs,
        }
    }
}

fn log_unavailable(prediction: &Prediction) {
    let log = |label: &str, reason: &Unavailable| match reason {
        Unavailable::MissingArtifact(_) => debug!(path = label, reason = %reason, "Model scores unavailable"),
        _ => warn!(path = label, reason = %reason, "Model scores unavailable"),
    };

    match (&prediction.esg, &prediction.sdg) {
        // Same cause for both, log it once
        (Outcome::Unavailable(esg), Outcome::Unavailable(sdg)) if esg == sdg => log("model", esg),
        (esg, sdg) => {
            if let Some(reason) = esg.reason() {
                log("esg", reason);
            }
            if let Some(reason) = sdg.reason() {
                log("sdg", reason);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{ArtifactHandle, ArtifactKind, ArtifactStore};
    use crate::models::{FeatureVector, LinearRegressor, ModelError, TfidfVectorizer, Vectorizer};
    use std::collections::HashMap;
    use std::sync::Arc;

    struct PanickingVectorizer;

    impl Vectorizer for PanickingVectorizer {
        fn dim(&self) -> usize {
            1
        }

        fn transform(&self, _text: &str) -> Result<FeatureVector, ModelError> {
            panic!("vectorizer state corrupted");
        }
    }

    fn composer(store: ArtifactStore) -> ScoreComposer {
        ScoreComposer::new(KeywordScorer::default(), ModelPredictor::new(Arc::new(store)))
    }

    async fn install_models(store: &ArtifactStore, vectorizer: Arc<dyn Vectorizer>) {
        store
            .install(ArtifactKind::Vectorizer, ArtifactHandle::Vectorizer(vectorizer))
            .await
            .unwrap();
        store
            .install(
                ArtifactKind::EsgRegressor,
                ArtifactHandle::Regressor(Arc::new(LinearRegressor::new(
                    vec![vec![0.5], vec![0.25], vec![0.0]],
                    vec![0.1, 0.1, 0.1],
                ))),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_heuristic_only_without_artifacts() {
        let response = composer(ArtifactStore::new(Vec::new()))
            .compose("wind farm with stakeholder engagement")
            .await;

        assert_eq!(response.scores.environmental, 0.3);
        assert_eq!(response.scores.governance, 0.3);
        assert_eq!(response.overall_score, 0.2);
        assert!(response.model_scores.is_none());
        assert!(response.sdgs.is_empty());
        assert_eq!(response.note.as_deref(), Some(MODEL_UNAVAILABLE_NOTE));
        assert_eq!(response.sdg_note.as_deref(), Some(SDG_UNAVAILABLE_NOTE));
    }

    #[tokio::test]
    async fn test_model_scores_merged_with_heuristics() {
        let store = ArtifactStore::new(Vec::new());
        let vocabulary = HashMap::from([("solar".to_string(), 0)]);
        install_models(&store, Arc::new(TfidfVectorizer::new(vocabulary, vec![1.0]))).await;

        let response = composer(store).compose("solar").await;

        assert_eq!(response.scores.environmental, 0.3);
        assert_eq!(
            response.model_scores,
            Some(EsgVector {
                environment: 0.6,
                social: 0.35,
                governance: 0.1
            })
        );
        assert!(response.note.is_none());
        // No SDG regressor installed
        assert!(response.sdgs.is_empty());
        assert!(response.sdg_note.is_some());
    }

    #[tokio::test]
    async fn test_model_panic_degrades_to_heuristics() {
        let store = ArtifactStore::new(Vec::new());
        install_models(&store, Arc::new(PanickingVectorizer)).await;
        let composer = composer(store);

        let response = composer.compose("solar").await;

        assert_eq!(response.scores.environmental, 0.3);
        assert_eq!(response.details.environmental, vec!["solar (medium impact)"]);
        assert!(response.model_scores.is_none());
        assert!(response.note.is_some());
        assert!(response.sdg_note.is_some());
    }
}
