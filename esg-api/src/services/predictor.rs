//! Model predictor
//!
//! Runs the learned scoring path: one vectorizer transform feeding the ESG
//! regressor and, when present, the SDG regressor. Every failure is converted
//! into an [`Outcome::Unavailable`] with a reason; nothing here returns an
//! error to the caller.
//!
//! The ESG and SDG sub-results are independent: an SDG failure never touches
//! the ESG result and vice versa.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::debug;

use crate::artifacts::{ArtifactKind, ArtifactStore};
use crate::models::{FeatureVector, ModelError, Regressor};
use crate::scoring::round2;

/// Why a model sub-score is missing
#[derive(Debug, Clone, PartialEq)]
pub enum Unavailable {
    /// Artifact could not be resolved
    MissingArtifact(ArtifactKind),
    /// Transform or predict failed, or the output had the wrong shape
    PredictionFailed(String),
    /// Unexpected fault while running the model path
    Internal(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::MissingArtifact(kind) => write!(f, "{} artifact unavailable", kind),
            Unavailable::PredictionFailed(msg) => write!(f, "prediction failed: {}", msg),
            Unavailable::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

/// Result of one model sub-prediction
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Available(T),
    Unavailable(Unavailable),
}

impl<T> Outcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Available(value) => Some(value),
            Outcome::Unavailable(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&Unavailable> {
        match self {
            Outcome::Available(_) => None,
            Outcome::Unavailable(reason) => Some(reason),
        }
    }
}

/// Model ESG scores, positional order of the regressor output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EsgVector {
    #[serde(rename = "Environment")]
    pub environment: f64,
    #[serde(rename = "Social")]
    pub social: f64,
    #[serde(rename = "Governance")]
    pub governance: f64,
}

impl EsgVector {
    /// Take the first three outputs, rounded to 2 decimals
    pub fn from_output(output: &[f64]) -> Result<Self, ModelError> {
        match output {
            [e, s, g, ..] if e.is_finite() && s.is_finite() && g.is_finite() => Ok(Self {
                environment: round2(*e),
                social: round2(*s),
                governance: round2(*g),
            }),
            [_, _, _, ..] => Err(ModelError::MalformedOutput(
                "non-finite ESG output".to_string(),
            )),
            _ => Err(ModelError::MalformedOutput(format!(
                "expected at least 3 ESG outputs, got {}",
                output.len()
            ))),
        }
    }
}

/// Model SDG scores; position `i` is goal `SDG{i+1}`
///
/// Serializes as a map in goal order (`SDG1`, `SDG2`, ..., `SDG10`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SdgVector(Vec<f64>);

impl SdgVector {
    /// Round every output to 2 decimals
    pub fn from_output(output: &[f64]) -> Result<Self, ModelError> {
        if let Some(i) = output.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::MalformedOutput(format!(
                "non-finite SDG{} output",
                i + 1
            )));
        }
        Ok(Self(output.iter().map(|v| round2(*v)).collect()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Score of goal `n` (1-based)
    pub fn goal(&self, n: usize) -> Option<f64> {
        n.checked_sub(1).and_then(|i| self.0.get(i)).copied()
    }
}

impl Serialize for SdgVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, value) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("SDG{}", i + 1), value)?;
        }
        map.end()
    }
}

/// Combined model output for one request
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub esg: Outcome<EsgVector>,
    pub sdg: Outcome<SdgVector>,
}

impl Prediction {
    /// Both sub-scores unavailable for the same reason
    pub fn unavailable(reason: Unavailable) -> Self {
        Self {
            esg: Outcome::Unavailable(reason.clone()),
            sdg: Outcome::Unavailable(reason),
        }
    }
}

/// Learned-model scoring over an [`ArtifactStore`]
#[derive(Clone)]
pub struct ModelPredictor {
    store: Arc<ArtifactStore>,
}

impl ModelPredictor {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    /// Score `text` with whatever models are available
    pub async fn predict(&self, text: &str) -> Prediction {
        let Some(vectorizer) = self.store.vectorizer().await else {
            return Prediction::unavailable(Unavailable::MissingArtifact(ArtifactKind::Vectorizer));
        };
        let Some(esg_model) = self.store.regressor(ArtifactKind::EsgRegressor).await else {
            return Prediction::unavailable(Unavailable::MissingArtifact(
                ArtifactKind::EsgRegressor,
            ));
        };
        let sdg_at_start = self.store.regressor(ArtifactKind::SdgRegressor).await;

        let features = match guarded("vectorizer", || vectorizer.transform(text)) {
            Outcome::Available(features) => features,
            Outcome::Unavailable(reason) => return Prediction::unavailable(reason),
        };

        let esg = guarded("esg", || predict_esg(esg_model.as_ref(), &features));

        // SDG support may be added to a running process, so retry once
        let sdg_model = match sdg_at_start {
            Some(model) => Some(model),
            None => {
                debug!("SDG regressor unavailable, retrying resolution");
                self.store.regressor(ArtifactKind::SdgRegressor).await
            }
        };

        let sdg = match sdg_model {
            None => Outcome::Unavailable(Unavailable::MissingArtifact(ArtifactKind::SdgRegressor)),
            Some(model) => guarded("sdg", || predict_sdg(model.as_ref(), &features)),
        };

        Prediction { esg, sdg }
    }
}

/// Run one model call, containing both its errors and its panics
fn guarded<T>(stage: &str, call: impl FnOnce() -> Result<T, ModelError>) -> Outcome<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Outcome::Available(value),
        Ok(Err(e)) => Outcome::Unavailable(Unavailable::PredictionFailed(format!("{}: {}", stage, e))),
        Err(payload) => Outcome::Unavailable(Unavailable::Internal(format!(
            "{} panicked: {}",
            stage,
            panic_message(payload.as_ref())
        ))),
    }
}

/// Readable text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "model prediction panicked".to_string()
    }
}

fn predict_esg(model: &dyn Regressor, features: &FeatureVector) -> Result<EsgVector, ModelError> {
    let output = model.predict(features)?;
    EsgVector::from_output(&output)
}

fn predict_sdg(model: &dyn Regressor, features: &FeatureVector) -> Result<SdgVector, ModelError> {
    let output = model.predict(features)?;
    SdgVector::from_output(&output)
}
