//! Multi-output linear regressor
//!
//! One independent linear model per output:
//! `y[j] = intercepts[j] + Σ coefficients[j][i] · x[i]`

use serde::{Deserialize, Serialize};

use super::{FeatureVector, ModelError, Regressor};

/// Fitted multi-output linear regressor (`*_regression.json` artifact)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    /// One row of length `n_features` per output
    pub coefficients: Vec<Vec<f64>>,
    /// One intercept per output
    pub intercepts: Vec<f64>,
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Self {
        Self {
            coefficients,
            intercepts,
        }
    }

    /// Check output and feature dimensions agree
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.is_empty() {
            return Err(ModelError::InvalidShape("no outputs".to_string()));
        }
        if self.coefficients.len() != self.intercepts.len() {
            return Err(ModelError::InvalidShape(format!(
                "{} coefficient rows but {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }
        let width = self.coefficients[0].len();
        if let Some(row) = self.coefficients.iter().position(|r| r.len() != width) {
            return Err(ModelError::InvalidShape(format!(
                "coefficient row {} has {} features, expected {}",
                row,
                self.coefficients[row].len(),
                width
            )));
        }
        Ok(())
    }
}

impl Regressor for LinearRegressor {
    fn n_features(&self) -> usize {
        self.coefficients.first().map_or(0, Vec::len)
    }

    fn n_outputs(&self) -> usize {
        self.intercepts.len()
    }

    fn predict(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| features.dot(row).map(|dot| intercept + dot))
            .collect()
    }
}
