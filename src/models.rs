//! Data models for the tasting board.
//!
//! This module contains the loaded tasting table and every derived
//! statistic handed to the presentation layer.

use crate::error::TastingError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// One row of the tasting sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TastingRecord {
    /// Name of the rated item, unique within a table.
    pub item_name: String,
    /// Grouping label.
    pub category: String,
    /// One score per reviewer, in the table's reviewer order.
    /// `None` marks a missing score.
    pub scores: Vec<Option<f64>>,
}

impl TastingRecord {
    pub fn new(item_name: &str, category: &str, scores: Vec<Option<f64>>) -> Self {
        Self {
            item_name: item_name.to_string(),
            category: category.to_string(),
            scores,
        }
    }
}

/// An ordered set of records sharing one fixed reviewer set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TastingTable {
    reviewers: Vec<String>,
    records: Vec<TastingRecord>,
}

impl TastingTable {
    /// Build a table, checking that every record matches the reviewer set
    /// and that item names are unique.
    pub fn new(reviewers: Vec<String>, records: Vec<TastingRecord>) -> Result<Self, TastingError> {
        let mut seen_reviewers: HashSet<&str> = HashSet::new();
        for reviewer in &reviewers {
            if !seen_reviewers.insert(reviewer.as_str()) {
                return Err(TastingError::Schema(format!(
                    "reviewer '{}' is listed twice",
                    reviewer
                )));
            }
        }

        let mut seen_items: HashMap<&str, usize> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            if record.scores.len() != reviewers.len() {
                return Err(TastingError::Schema(format!(
                    "item '{}' has {} scores, expected {}",
                    record.item_name,
                    record.scores.len(),
                    reviewers.len()
                )));
            }
            if let Some(first) = seen_items.insert(record.item_name.as_str(), idx) {
                return Err(TastingError::DuplicateItem {
                    item: record.item_name.clone(),
                    first: first + 1,
                    second: idx + 1,
                });
            }
        }

        Ok(Self { reviewers, records })
    }

    pub fn reviewers(&self) -> &[String] {
        &self.reviewers
    }

    pub fn records(&self) -> &[TastingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a reviewer's column.
    pub fn reviewer_index(&self, reviewer: &str) -> Result<usize, TastingError> {
        self.reviewers
            .iter()
            .position(|r| r == reviewer)
            .ok_or_else(|| TastingError::UnknownReviewer(reviewer.to_string()))
    }

    /// All scores of one reviewer, aligned with table order.
    pub fn column(&self, index: usize) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.scores[index]).collect()
    }

    /// Distinct categories in label order.
    pub fn categories(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Pearson correlation between every pair of reviewers.
///
/// `None` cells are undefined (a series without variance, or fewer than two
/// rows scored by both reviewers) and must be shown as such.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub reviewers: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between two reviewers, if defined.
    pub fn get(&self, first: &str, second: &str) -> Option<f64> {
        let i = self.reviewers.iter().position(|r| r == first)?;
        let j = self.reviewers.iter().position(|r| r == second)?;
        self.values[i][j]
    }

    /// Off-diagonal pairs in canonical order: `(i, j)` with `i < j` by
    /// reviewer column order.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let n = self.reviewers.len();
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect()
    }
}

/// Per-category, per-reviewer mean scores. Categories iterate in label order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryMeans {
    pub means: BTreeMap<String, BTreeMap<String, f64>>,
}

impl CategoryMeans {
    pub fn get(&self, category: &str, reviewer: &str) -> Option<f64> {
        self.means.get(category)?.get(reviewer).copied()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.means.keys().map(String::as_str)
    }

    /// Mean of the reviewer means of one category.
    pub fn category_mean(&self, category: &str) -> Option<f64> {
        let per_reviewer = self.means.get(category)?;
        if per_reviewer.is_empty() {
            return None;
        }
        Some(per_reviewer.values().sum::<f64>() / per_reviewer.len() as f64)
    }
}

/// A single entry of a reviewer's ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopEntry {
    pub item_name: String,
    pub score: f64,
}

/// Distribution of one reviewer's scores (the box-plot numbers).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewerSummary {
    pub reviewer: String,
    /// Number of defined scores.
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// A named superlative value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Superlative {
    pub name: String,
    pub value: f64,
}

/// The reviewer pair that agrees most.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewerPair {
    pub first: String,
    pub second: String,
    pub correlation: f64,
}

/// Headline facts used for the written conclusions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadlineFacts {
    pub best_item: Option<Superlative>,
    pub worst_item: Option<Superlative>,
    pub best_category: Option<Superlative>,
    pub worst_category: Option<Superlative>,
    /// Reviewer with the lowest sample standard deviation.
    pub most_consistent: Option<Superlative>,
    /// Reviewer with the highest sample standard deviation.
    pub least_consistent: Option<Superlative>,
    pub most_correlated: Option<ReviewerPair>,
}
