//! Keyword-weighted ESG scorer
//!
//! Scores a project description by plain substring matching against a static
//! table of impact terms. Each category is scanned high → medium → low; every
//! matching term adds its tier weight and one evidence string. The per-category
//! sum is clamped to 1.0 and rounded to 2 decimals.
//!
//! Matching is case-insensitive and not word-boundary aware: "solar" matches
//! inside "solarpunk", and "renewable energy" only matches as a contiguous
//! phrase.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::round2;

/// ESG scoring category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Environmental,
    Social,
    Governance,
}

impl Category {
    /// All categories in output order
    pub const ALL: [Category; 3] = [
        Category::Environmental,
        Category::Social,
        Category::Governance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Environmental => "Environmental",
            Category::Social => "Social",
            Category::Governance => "Governance",
        }
    }
}

/// Impact tier of a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactTier {
    High,
    Medium,
    Low,
}

impl ImpactTier {
    /// Scan order within a category
    pub const ALL: [ImpactTier; 3] = [ImpactTier::High, ImpactTier::Medium, ImpactTier::Low];

    /// Weight added to the category score for each matching term
    pub fn weight(&self) -> f64 {
        match self {
            ImpactTier::High => 0.5,
            ImpactTier::Medium => 0.3,
            ImpactTier::Low => 0.2,
        }
    }

    /// Label used in evidence strings
    pub fn label(&self) -> &'static str {
        match self {
            ImpactTier::High => "high",
            ImpactTier::Medium => "medium",
            ImpactTier::Low => "low",
        }
    }
}

/// One value per category, serialized as `{Environmental, Social, Governance}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerCategory<T> {
    #[serde(rename = "Environmental")]
    pub environmental: T,
    #[serde(rename = "Social")]
    pub social: T,
    #[serde(rename = "Governance")]
    pub governance: T,
}

impl<T> PerCategory<T> {
    pub fn get(&self, category: Category) -> &T {
        match category {
            Category::Environmental => &self.environmental,
            Category::Social => &self.social,
            Category::Governance => &self.governance,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Environmental => &mut self.environmental,
            Category::Social => &mut self.social,
            Category::Governance => &mut self.governance,
        }
    }
}

/// Impact terms of a single category, grouped by tier
#[derive(Debug, Clone)]
pub struct CategoryTerms {
    pub category: Category,
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

impl CategoryTerms {
    pub fn new(category: Category, high: &[&str], medium: &[&str], low: &[&str]) -> Self {
        let owned = |terms: &[&str]| terms.iter().map(|t| t.to_lowercase()).collect();
        Self {
            category,
            high: owned(high),
            medium: owned(medium),
            low: owned(low),
        }
    }

    pub fn terms(&self, tier: ImpactTier) -> &[String] {
        match tier {
            ImpactTier::High => &self.high,
            ImpactTier::Medium => &self.medium,
            ImpactTier::Low => &self.low,
        }
    }
}

/// Keyword table covering every category
#[derive(Debug, Clone)]
pub struct KeywordTable {
    categories: Vec<CategoryTerms>,
}

static DEFAULT_TABLE: Lazy<KeywordTable> = Lazy::new(|| {
    KeywordTable::new(vec![
        CategoryTerms::new(
            Category::Environmental,
            &[
                "renewable energy",
                "carbon reduction",
                "climate action",
                "environmental protection",
            ],
            &["solar", "wind", "water conservation", "recycling", "biodiversity"],
            &["green", "sustainable", "eco-friendly", "natural resources"],
        ),
        CategoryTerms::new(
            Category::Social,
            &[
                "community development",
                "poverty reduction",
                "healthcare access",
                "education equality",
            ],
            &["job creation", "skill training", "social welfare", "gender equality"],
            &["community", "training", "social", "welfare"],
        ),
        CategoryTerms::new(
            Category::Governance,
            &[
                "transparency initiative",
                "anti-corruption",
                "accountability framework",
            ],
            &["governance policy", "compliance program", "stakeholder engagement"],
            &[
                "reporting",
                "monitoring",
                "policy",
                "regulation",
                "governance",
                "transparent",
            ],
        ),
    ])
});

impl KeywordTable {
    /// Build a table. Categories missing from `categories` score 0.0.
    pub fn new(categories: Vec<CategoryTerms>) -> Self {
        Self { categories }
    }

    /// The built-in reference table
    pub fn default_table() -> &'static KeywordTable {
        &DEFAULT_TABLE
    }

    pub fn categories(&self) -> &[CategoryTerms] {
        &self.categories
    }
}

/// Heuristic scores and their matched-term evidence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordScoreResult {
    pub scores: PerCategory<f64>,
    pub details: PerCategory<Vec<String>>,
}

impl KeywordScoreResult {
    /// Mean of the three category scores, rounded to 2 decimals
    pub fn overall(&self) -> f64 {
        let sum: f64 = Category::ALL.iter().map(|c| *self.scores.get(*c)).sum();
        round2(sum / Category::ALL.len() as f64)
    }
}

/// Keyword-weighted scorer over a [`KeywordTable`]
#[derive(Debug, Clone, Copy)]
pub struct KeywordScorer {
    table: &'static KeywordTable,
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new(KeywordTable::default_table())
    }
}

impl KeywordScorer {
    pub fn new(table: &'static KeywordTable) -> Self {
        Self { table }
    }

    /// Score `text` against the table. Total over all inputs.
    pub fn score(&self, text: &str) -> KeywordScoreResult {
        let text = text.to_lowercase();
        let mut result = KeywordScoreResult::default();

        for entry in self.table.categories() {
            let mut sum = 0.0;
            let evidence = result.details.get_mut(entry.category);

            for tier in ImpactTier::ALL {
                for term in entry.terms(tier) {
                    if text.contains(term.as_str()) {
                        sum += tier.weight();
                        evidence.push(format!("{} ({} impact)", term, tier.label()));
                    }
                }
            }

            *result.scores.get_mut(entry.category) = round2(sum.min(1.0));
        }

        result
    }
}
