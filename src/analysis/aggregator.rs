//! Tasting statistics.
//!
//! Every function here is a pure function of a [`TastingTable`]: calling it
//! twice on the same table gives bit-identical results. Scores are never
//! clamped, so out-of-range ratings flow straight into the statistics.

use super::stats::{self, Degenerate};
use crate::error::TastingError;
use crate::models::{
    CategoryMeans, CorrelationMatrix, HeadlineFacts, ReviewerPair, ReviewerSummary, Superlative,
    TastingRecord, TastingTable, TopEntry,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Mean across all reviewers for each record, aligned with table order.
///
/// A record with any missing score has an undefined mean.
pub fn row_mean(table: &TastingTable) -> Vec<Option<f64>> {
    table.records().iter().map(record_mean).collect()
}

fn record_mean(record: &TastingRecord) -> Option<f64> {
    let scores: Vec<f64> = record.scores.iter().copied().collect::<Option<_>>()?;
    stats::mean(&scores)
}

/// Pearson correlation of two reviewers over the rows both of them scored.
pub fn pair_correlation(
    table: &TastingTable,
    first: &str,
    second: &str,
) -> Result<f64, TastingError> {
    let i = table.reviewer_index(first)?;
    let j = table.reviewer_index(second)?;

    let (x, y): (Vec<f64>, Vec<f64>) = table
        .records()
        .iter()
        .filter_map(|r| Some((r.scores[i]?, r.scores[j]?)))
        .unzip();

    stats::pearson(&x, &y).map_err(|reason| {
        let reviewer = match reason {
            Degenerate::Second => second,
            Degenerate::First | Degenerate::TooShort => first,
        };
        TastingError::DegenerateSeries {
            reviewer: reviewer.to_string(),
        }
    })
}

/// Reviewer-by-reviewer correlation matrix.
///
/// Undefined pairs are `None` instead of failing the whole matrix. The
/// diagonal is exactly 1.0 for every reviewer whose scores vary.
pub fn correlation_matrix(table: &TastingTable) -> CorrelationMatrix {
    let reviewers = table.reviewers().to_vec();
    let n = reviewers.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        for j in 0..n {
            values[i][j] = if j < i {
                values[j][i]
            } else {
                match pair_correlation(table, &reviewers[i], &reviewers[j]) {
                    Ok(_) if i == j => Some(1.0),
                    Ok(r) => Some(r),
                    Err(e) => {
                        debug!("{} / {}: {}", reviewers[i], reviewers[j], e);
                        None
                    }
                }
            };
        }
    }

    CorrelationMatrix { reviewers, values }
}

/// Per-category mean score of each reviewer, categories in label order.
///
/// Missing scores are skipped; a reviewer without any score in a category
/// has no entry for it.
pub fn category_means(table: &TastingTable) -> CategoryMeans {
    let mut groups: BTreeMap<&str, Vec<&TastingRecord>> = BTreeMap::new();
    for record in table.records() {
        groups.entry(record.category.as_str()).or_default().push(record);
    }

    let mut means = BTreeMap::new();
    for (category, records) in groups {
        let mut per_reviewer = BTreeMap::new();
        for (idx, reviewer) in table.reviewers().iter().enumerate() {
            let scores: Vec<f64> = records.iter().filter_map(|r| r.scores[idx]).collect();
            if let Some(mean) = stats::mean(&scores) {
                per_reviewer.insert(reviewer.clone(), mean);
            }
        }
        means.insert(category.to_string(), per_reviewer);
    }

    CategoryMeans { means }
}

/// The `n` best-scored records of one reviewer, highest first.
///
/// Ties keep table order. Records the reviewer did not score are skipped.
pub fn top_n(
    table: &TastingTable,
    reviewer: &str,
    n: usize,
) -> Result<Vec<TopEntry>, TastingError> {
    let idx = table.reviewer_index(reviewer)?;

    let mut entries: Vec<TopEntry> = table
        .records()
        .iter()
        .filter_map(|r| {
            r.scores[idx].map(|score| TopEntry {
                item_name: r.item_name.clone(),
                score,
            })
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries.truncate(n);

    Ok(entries)
}

/// Distribution summary of every reviewer, in reviewer order.
pub fn reviewer_summaries(table: &TastingTable) -> Vec<ReviewerSummary> {
    table
        .reviewers()
        .iter()
        .enumerate()
        .map(|(idx, reviewer)| {
            let mut scores: Vec<f64> = table.column(idx).into_iter().flatten().collect();
            let mean = stats::mean(&scores);
            let std_dev = stats::sample_std_dev(&scores);
            scores.sort_by(f64::total_cmp);

            ReviewerSummary {
                reviewer: reviewer.clone(),
                count: scores.len(),
                mean,
                std_dev,
                min: scores.first().copied(),
                q1: stats::quantile(&scores, 0.25),
                median: stats::quantile(&scores, 0.5),
                q3: stats::quantile(&scores, 0.75),
                max: scores.last().copied(),
            }
        })
        .collect()
}

/// Superlatives for the written conclusions.
pub fn headline(table: &TastingTable) -> HeadlineFacts {
    headline_from(
        table,
        &row_mean(table),
        &category_means(table),
        &reviewer_summaries(table),
        &correlation_matrix(table),
    )
}

fn headline_from(
    table: &TastingTable,
    row_means: &[Option<f64>],
    categories: &CategoryMeans,
    summaries: &[ReviewerSummary],
    matrix: &CorrelationMatrix,
) -> HeadlineFacts {
    let items = || {
        table
            .records()
            .iter()
            .zip(row_means)
            .filter_map(|(r, m)| Some((r.item_name.as_str(), (*m)?)))
    };
    let category_values = || {
        categories
            .categories()
            .filter_map(move |c| Some((c, categories.category_mean(c)?)))
    };
    let spreads = || {
        summaries
            .iter()
            .filter_map(|s| Some((s.reviewer.as_str(), s.std_dev?)))
    };

    let mut most_correlated: Option<ReviewerPair> = None;
    for (i, j) in matrix.pairs() {
        let Some(r) = matrix.values[i][j] else {
            continue;
        };
        if most_correlated.as_ref().map_or(true, |best| r > best.correlation) {
            most_correlated = Some(ReviewerPair {
                first: matrix.reviewers[i].clone(),
                second: matrix.reviewers[j].clone(),
                correlation: r,
            });
        }
    }

    HeadlineFacts {
        best_item: pick(items(), |candidate, best| candidate > best),
        worst_item: pick(items(), |candidate, best| candidate < best),
        best_category: pick(category_values(), |candidate, best| candidate > best),
        worst_category: pick(category_values(), |candidate, best| candidate < best),
        most_consistent: pick(spreads(), |candidate, best| candidate < best),
        least_consistent: pick(spreads(), |candidate, best| candidate > best),
        most_correlated,
    }
}

/// First candidate that no later candidate strictly beats.
fn pick<'a>(
    candidates: impl Iterator<Item = (&'a str, f64)>,
    beats: fn(f64, f64) -> bool,
) -> Option<Superlative> {
    let mut best: Option<(&str, f64)> = None;
    for (name, value) in candidates {
        if best.map_or(true, |(_, current)| beats(value, current)) {
            best = Some((name, value));
        }
    }
    best.map(|(name, value)| Superlative {
        name: name.to_string(),
        value,
    })
}

/// Ranking of one reviewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewerTop {
    pub reviewer: String,
    pub entries: Vec<TopEntry>,
}

/// Every statistic a presentation adapter consumes, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub row_means: Vec<Option<f64>>,
    pub reviewer_summaries: Vec<ReviewerSummary>,
    pub correlation: CorrelationMatrix,
    pub category_means: CategoryMeans,
    pub top_picks: Vec<ReviewerTop>,
    pub headline: HeadlineFacts,
}

impl Aggregates {
    /// Compute all statistics for a table, ranking `top` items per reviewer.
    pub fn compute(table: &TastingTable, top: usize) -> Result<Self, TastingError> {
        let row_means = row_mean(table);
        let reviewer_summaries = reviewer_summaries(table);
        let correlation = correlation_matrix(table);
        let category_means = category_means(table);

        let top_picks = table
            .reviewers()
            .iter()
            .map(|reviewer| {
                Ok(ReviewerTop {
                    reviewer: reviewer.clone(),
                    entries: top_n(table, reviewer, top)?,
                })
            })
            .collect::<Result<Vec<_>, TastingError>>()?;

        let headline = headline_from(
            table,
            &row_means,
            &category_means,
            &reviewer_summaries,
            &correlation,
        );

        debug!(
            "Aggregated {} items, {} categories",
            table.len(),
            category_means.means.len()
        );

        Ok(Self {
            row_means,
            reviewer_summaries,
            correlation,
            category_means,
            top_picks,
            headline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(reviewers: &[&str], rows: &[(&str, &str, &[Option<f64>])]) -> TastingTable {
        TastingTable::new(
            reviewers.iter().map(|r| r.to_string()).collect(),
            rows.iter()
                .map(|(item, category, scores)| TastingRecord::new(item, category, scores.to_vec()))
                .collect(),
        )
        .unwrap()
    }

    fn cheese_table() -> TastingTable {
        table(
            &["A", "B", "C"],
            &[
                ("Brie", "Soft", &[Some(8.0), Some(9.0), Some(7.0)]),
                ("Gouda", "Hard", &[Some(6.0), Some(6.0), Some(6.0)]),
                ("Feta", "Soft", &[Some(5.0), Some(4.0), Some(5.0)]),
            ],
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_row_mean_scenario() {
        let means = row_mean(&cheese_table());
        assert_eq!(means.len(), 3);
        assert_eq!(means[0], Some(8.0));
        assert_eq!(means[1], Some(6.0));
        assert!(approx(means[2].unwrap(), 4.667));
    }

    #[test]
    fn test_row_mean_missing_score_is_undefined() {
        let t = table(
            &["A", "B"],
            &[
                ("Brie", "Soft", &[Some(8.0), None]),
                ("Feta", "Soft", &[Some(5.0), Some(4.0)]),
            ],
        );
        assert_eq!(row_mean(&t), vec![None, Some(4.5)]);
    }

    #[test]
    fn test_category_means_scenario() {
        let means = category_means(&cheese_table());
        assert_eq!(means.categories().collect::<Vec<_>>(), vec!["Hard", "Soft"]);
        assert_eq!(means.get("Soft", "A"), Some(6.5));
        assert_eq!(means.get("Soft", "B"), Some(6.5));
        assert_eq!(means.get("Hard", "C"), Some(6.0));
    }

    #[test]
    fn test_category_means_skip_missing_scores() {
        let t = table(
            &["A", "B"],
            &[
                ("Brie", "Soft", &[Some(8.0), None]),
                ("Feta", "Soft", &[Some(4.0), None]),
            ],
        );
        let means = category_means(&t);
        assert_eq!(means.get("Soft", "A"), Some(6.0));
        assert_eq!(means.get("Soft", "B"), None);
    }

    #[test]
    fn test_top_n_scenario() {
        let t = cheese_table();
        let top = top_n(&t, "A", 1).unwrap();
        assert_eq!(
            top,
            vec![TopEntry {
                item_name: "Brie".to_string(),
                score: 8.0
            }]
        );
        assert!(top_n(&t, "A", 0).unwrap().is_empty());
    }

    #[test]
    fn test_top_n_all_records_stable_on_ties() {
        let t = table(
            &["A"],
            &[
                ("First", "X", &[Some(7.0)]),
                ("Second", "X", &[Some(9.0)]),
                ("Third", "Y", &[Some(7.0)]),
                ("Fourth", "Y", &[Some(9.0)]),
            ],
        );
        let names: Vec<String> = top_n(&t, "A", 10)
            .unwrap()
            .into_iter()
            .map(|e| e.item_name)
            .collect();
        assert_eq!(names, vec!["Second", "Fourth", "First", "Third"]);
    }

    #[test]
    fn test_top_n_unknown_reviewer() {
        let err = top_n(&cheese_table(), "Z", 3).unwrap_err();
        assert!(matches!(err, TastingError::UnknownReviewer(ref r) if r == "Z"));
    }

    #[test]
    fn test_correlation_matrix_symmetric_with_unit_diagonal() {
        let matrix = correlation_matrix(&cheese_table());
        for i in 0..3 {
            assert_eq!(matrix.values[i][i], Some(1.0));
            for j in 0..3 {
                assert_eq!(matrix.values[i][j], matrix.values[j][i]);
                let r = matrix.values[i][j].unwrap();
                assert!((-1.0..=1.0).contains(&r));
            }
        }
    }

    #[test]
    fn test_correlation_constant_reviewer_is_undefined_per_pair() {
        let t = table(
            &["A", "B", "C"],
            &[
                ("Brie", "Soft", &[Some(8.0), Some(9.0), Some(6.0)]),
                ("Gouda", "Hard", &[Some(6.0), Some(6.0), Some(6.0)]),
                ("Feta", "Soft", &[Some(5.0), Some(4.0), Some(6.0)]),
            ],
        );
        let matrix = correlation_matrix(&t);

        assert_eq!(matrix.get("C", "C"), None);
        assert_eq!(matrix.get("A", "C"), None);
        assert_eq!(matrix.get("C", "B"), None);
        assert!(matrix.get("A", "B").is_some());
        assert_eq!(matrix.get("A", "A"), Some(1.0));

        let err = pair_correlation(&t, "A", "C").unwrap_err();
        assert!(matches!(err, TastingError::DegenerateSeries { ref reviewer } if reviewer == "C"));
    }

    #[test]
    fn test_correlation_known_coefficients() {
        let matrix = correlation_matrix(&cheese_table());

        // A = 8, 6, 5; B = 9, 6, 4; C = 7, 6, 5
        let ab = 23.0 / 532.0_f64.sqrt();
        let ac = 3.0 / (28.0_f64 / 3.0).sqrt();
        assert!((matrix.get("A", "B").unwrap() - ab).abs() < 1e-9);
        assert!((matrix.get("A", "C").unwrap() - ac).abs() < 1e-9);
        assert!(approx(matrix.get("B", "A").unwrap(), 0.9972));
        assert!(approx(matrix.get("C", "A").unwrap(), 0.9820));
    }

    #[test]
    fn test_correlation_constant_fractional_reviewer_is_undefined() {
        for v in [5.9, 3.3, 0.1] {
            let t = table(
                &["A", "C"],
                &[
                    ("Brie", "Soft", &[Some(8.0), Some(v)]),
                    ("Gouda", "Hard", &[Some(6.0), Some(v)]),
                    ("Feta", "Soft", &[Some(5.0), Some(v)]),
                ],
            );
            let matrix = correlation_matrix(&t);

            assert_eq!(matrix.get("C", "C"), None);
            assert_eq!(matrix.get("A", "C"), None);
            assert_eq!(matrix.get("C", "A"), None);
            assert_eq!(matrix.get("A", "A"), Some(1.0));
            assert_eq!(reviewer_summaries(&t)[1].std_dev, Some(0.0));
        }
    }

    #[test]
    fn test_out_of_range_scores_are_not_clamped() {
        let t = table(
            &["A", "B"],
            &[
                ("Brie", "Soft", &[Some(0.0), Some(15.0)]),
                ("Feta", "Soft", &[Some(5.0), Some(4.0)]),
                ("Gouda", "Hard", &[Some(10.0), Some(1.0)]),
            ],
        );
        assert_eq!(row_mean(&t)[0], Some(7.5));
        let r = correlation_matrix(&t).get("A", "B").unwrap();
        assert!(r < 0.0);
        assert!(r >= -1.0);
    }

    #[test]
    fn test_reviewer_summaries() {
        let summaries = reviewer_summaries(&cheese_table());
        assert_eq!(summaries.len(), 3);

        let a = &summaries[0];
        assert_eq!(a.reviewer, "A");
        assert_eq!(a.count, 3);
        assert!(approx(a.mean.unwrap(), 6.333));
        assert!(approx(a.std_dev.unwrap(), 1.528));
        assert_eq!(a.min, Some(5.0));
        assert_eq!(a.median, Some(6.0));
        assert_eq!(a.max, Some(8.0));
    }

    #[test]
    fn test_headline_facts() {
        let facts = headline(&cheese_table());

        assert_eq!(facts.best_item.as_ref().unwrap().name, "Brie");
        assert_eq!(facts.worst_item.as_ref().unwrap().name, "Feta");
        // Soft: A 6.5, B 6.5, C 6.0 -> 6.333; Hard: 6.0
        assert_eq!(facts.best_category.as_ref().unwrap().name, "Soft");
        assert_eq!(facts.worst_category.as_ref().unwrap().name, "Hard");
        // C has the smallest spread, B the largest
        assert_eq!(facts.most_consistent.as_ref().unwrap().name, "C");
        assert_eq!(facts.least_consistent.as_ref().unwrap().name, "B");
        assert!(facts.most_correlated.is_some());
    }

    #[test]
    fn test_headline_ties_keep_first() {
        let t = table(
            &["A", "B", "C"],
            &[
                ("One", "X", &[Some(1.0), Some(1.0), Some(1.0)]),
                ("Two", "Y", &[Some(2.0), Some(2.0), Some(2.0)]),
                ("Three", "Z", &[Some(2.0), Some(2.0), Some(2.0)]),
            ],
        );
        let facts = headline(&t);

        assert_eq!(facts.best_item.unwrap().name, "Two");
        assert_eq!(facts.best_category.unwrap().name, "Y");
        let pair = facts.most_correlated.unwrap();
        assert_eq!((pair.first.as_str(), pair.second.as_str()), ("A", "B"));
        assert_eq!(facts.most_consistent.unwrap().name, "A");
    }

    #[test]
    fn test_headline_without_correlation() {
        let t = table(&["A"], &[("Solo", "X", &[Some(4.0)])]);
        let facts = headline(&t);
        assert!(facts.most_correlated.is_none());
        assert!(facts.most_consistent.is_none());
        assert_eq!(facts.best_item.unwrap().name, "Solo");
    }

    #[test]
    fn test_aggregates_are_idempotent() {
        let t = cheese_table();
        let first = Aggregates::compute(&t, 3).unwrap();
        let second = Aggregates::compute(&t, 3).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.top_picks.len(), 3);
        assert_eq!(first.top_picks[1].entries[0].item_name, "Brie");
    }
}
