//! TF-IDF text vectorizer
//!
//! Tokenization matches the usual `\b\w\w+\b` token pattern: runs of
//! alphanumeric or underscore characters, at least two characters long.
//! Out-of-vocabulary tokens are ignored.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{FeatureVector, ModelError, Vectorizer};

/// Row normalization applied after IDF weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Fitted TF-IDF vectorizer
///
/// Serialized form is the `vectorizer.json` artifact. `idf` is `null` (or
/// absent) for a vectorizer that was never fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Term → feature index
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per feature index
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    /// Use `1 + ln(tf)` instead of raw term counts
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

fn default_lowercase() -> bool {
    true
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

impl TfidfVectorizer {
    /// Fitted vectorizer with default options (lowercase, raw tf, l2 norm)
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Self {
        Self {
            vocabulary,
            idf: Some(idf),
            lowercase: default_lowercase(),
            sublinear_tf: false,
            norm: default_norm(),
        }
    }

    /// Check that the vectorizer carries usable fitted state
    pub fn validate(&self) -> Result<(), ModelError> {
        let idf = match self.idf.as_deref() {
            Some(idf) if !idf.is_empty() => idf,
            _ => return Err(ModelError::NotFitted("IDF weights missing".to_string())),
        };
        if self.vocabulary.is_empty() {
            return Err(ModelError::NotFitted("vocabulary is empty".to_string()));
        }
        if let Some((term, index)) = self.vocabulary.iter().find(|(_, i)| **i >= idf.len()) {
            return Err(ModelError::InvalidShape(format!(
                "term '{}' maps to index {} but only {} IDF weights are present",
                term,
                index,
                idf.len()
            )));
        }
        if idf.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::InvalidShape("non-finite IDF weight".to_string()));
        }
        Ok(())
    }

    fn fitted_idf(&self) -> Result<&[f64], ModelError> {
        self.idf
            .as_deref()
            .filter(|idf| !idf.is_empty())
            .ok_or_else(|| ModelError::NotFitted("IDF weights missing".to_string()))
    }
}

/// Split text into candidate tokens
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().nth(1).is_some())
}

impl Vectorizer for TfidfVectorizer {
    fn dim(&self) -> usize {
        self.idf.as_ref().map_or(0, Vec::len)
    }

    fn transform(&self, text: &str) -> Result<FeatureVector, ModelError> {
        let idf = self.fitted_idf()?;
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        // BTreeMap keeps summation order stable across calls
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(&text) {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut pairs = Vec::with_capacity(counts.len());
        for (index, count) in counts {
            let weight = idf.get(index).ok_or(ModelError::IndexOutOfRange {
                index,
                dim: idf.len(),
            })?;
            let tf = if self.sublinear_tf { 1.0 + count.ln() } else { count };
            pairs.push((index, tf * weight));
        }

        let norm = match self.norm {
            Some(Norm::L2) => pairs.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => pairs.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        if norm > 0.0 {
            for (_, value) in pairs.iter_mut() {
                *value /= norm;
            }
        }

        FeatureVector::from_pairs(idf.len(), pairs)
    }
}
