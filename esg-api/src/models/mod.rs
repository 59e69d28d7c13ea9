//! Learned-model capabilities
//!
//! A model artifact is usable through one of two capability traits:
//! - [`Vectorizer`]: text → feature vector
//! - [`Regressor`]: feature vector → numeric outputs
//!
//! Concrete implementations live in [`tfidf`] and [`linear`]. The artifact
//! store validates them when they are loaded, so predictors never check for
//! capabilities at call time.

pub mod linear;
pub mod tfidf;

pub use linear::LinearRegressor;
pub use tfidf::TfidfVectorizer;

use thiserror::Error;

/// Failure while transforming or predicting
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Feature dimension mismatch: model expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Feature index {index} out of range for dimension {dim}")]
    IndexOutOfRange { index: usize, dim: usize },

    #[error("Model not fitted: {0}")]
    NotFitted(String),

    #[error("Invalid model shape: {0}")]
    InvalidShape(String),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Model failure: {0}")]
    Failed(String),
}

/// Sparse feature vector produced by a [`Vectorizer`]
///
/// `indices` are strictly increasing and all below `dim`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build from (index, value) pairs. Duplicate indices are summed.
    pub fn from_pairs(
        dim: usize,
        mut pairs: Vec<(usize, f64)>,
    ) -> Result<Self, ModelError> {
        pairs.sort_by_key(|(i, _)| *i);

        let mut indices: Vec<usize> = Vec::with_capacity(pairs.len());
        let mut values: Vec<f64> = Vec::with_capacity(pairs.len());
        for (index, value) in pairs {
            if index >= dim {
                return Err(ModelError::IndexOutOfRange { index, dim });
            }
            match indices.last() {
                Some(last) if *last == index => {
                    if let Some(v) = values.last_mut() {
                        *v += value;
                    }
                }
                _ => {
                    indices.push(index);
                    values.push(value);
                }
            }
        }

        Ok(Self { dim, indices, values })
    }

    /// Build from a dense slice, dropping zeros
    #[cfg(test)]
    pub fn from_dense(dense: &[f64]) -> Self {
        let (indices, values) = dense
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, v)| (i, *v))
            .unzip();
        Self {
            dim: dense.len(),
            indices,
            values,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Iterate non-zero entries as (index, value)
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    #[cfg(test)]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Dot product with a dense weight row of length `dim`
    pub fn dot(&self, weights: &[f64]) -> Result<f64, ModelError> {
        if weights.len() != self.dim {
            return Err(ModelError::DimensionMismatch {
                expected: weights.len(),
                actual: self.dim,
            });
        }
        Ok(self.iter().map(|(i, v)| weights[i] * v).sum())
    }
}

/// Text → feature vector capability
pub trait Vectorizer: Send + Sync {
    /// Number of features produced
    fn dim(&self) -> usize;

    fn transform(&self, text: &str) -> Result<FeatureVector, ModelError>;
}

/// Feature vector → numeric outputs capability
pub trait Regressor: Send + Sync {
    /// Number of input features expected
    fn n_features(&self) -> usize;

    /// Number of outputs produced per prediction
    fn n_outputs(&self) -> usize;

    fn predict(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError>;
}
