//! Heuristic scoring
//!
//! Keyword-weighted ESG scoring that needs no model artifacts.

pub mod keywords;

pub use keywords::{
    Category, CategoryTerms, ImpactTier, KeywordScoreResult, KeywordScorer, KeywordTable,
    PerCategory,
};

/// Round to 2 decimal places, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
