//! Scoring services
//!
//! - [`predictor`]: learned-model path over the artifact store
//! - [`composer`]: merges heuristic and model results into one response

pub mod composer;
pub mod predictor;

pub use composer::{ComposedResponse, InputEcho, ScoreComposer};
pub use predictor::{EsgVector, ModelPredictor, Outcome, Prediction, SdgVector, Unavailable};
