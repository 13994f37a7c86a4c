//! Chart-ready series for the JSON export.
//!
//! The series mirror the dashboard charts: a strip plot of every score with
//! a mean line, one box per reviewer, the correlation heatmap and a radar
//! of category means. A plotting front end only has to draw them.

use super::{RenderOptions, Report};
use crate::models::ReviewerSummary;
use serde::Serialize;

/// Lower and upper end of the rating axis.
pub const SCORE_AXIS: (f64, f64) = (0.5, 10.5);

#[derive(Debug, Clone, Serialize)]
pub struct StripTrace {
    pub name: String,
    pub color: String,
    /// `markers` for reviewers, `lines+markers` for the mean.
    pub mode: &'static str,
    /// Scores with the reviewer's jitter applied.
    pub x: Vec<Option<f64>>,
    /// Item names.
    pub y: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxTrace {
    pub name: String,
    pub color: String,
    pub values: Vec<f64>,
    pub summary: ReviewerSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct Heatmap {
    pub labels: Vec<String>,
    pub z: Vec<Vec<Option<f64>>>,
    pub zmin: f64,
    pub zmax: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RadarTrace {
    pub name: String,
    pub color: String,
    /// Categories, first repeated at the end to close the polygon.
    pub theta: Vec<String>,
    pub r: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSet {
    pub score_axis: (f64, f64),
    pub strip: Vec<StripTrace>,
    pub boxes: Vec<BoxTrace>,
    pub heatmap: Heatmap,
    pub radar: Vec<RadarTrace>,
}

impl ChartSet {
    pub fn build(report: &Report, options: &RenderOptions) -> Self {
        let reviewers = &report.metadata.reviewers;
        let item_names: Vec<String> = report.items.iter().map(|i| i.item_name.clone()).collect();

        let mut strip: Vec<StripTrace> = reviewers
            .iter()
            .enumerate()
            .map(|(idx, reviewer)| {
                let offset = options.jitter_for(idx);
                StripTrace {
                    name: reviewer.clone(),
                    color: options.color_for(reviewer, idx),
                    mode: "markers",
                    x: report
                        .items
                        .iter()
                        .map(|i| i.scores[idx].map(|s| s + offset))
                        .collect(),
                    y: item_names.clone(),
                }
            })
            .collect();
        strip.push(StripTrace {
            name: "Mean".to_string(),
            color: options.mean_color.clone(),
            mode: "lines+markers",
            x: report.items.iter().map(|i| i.mean).collect(),
            y: item_names,
        });

        let boxes = report
            .aggregates
            .reviewer_summaries
            .iter()
            .enumerate()
            .map(|(idx, summary)| BoxTrace {
                name: summary.reviewer.clone(),
                color: options.color_for(&summary.reviewer, idx),
                values: report.items.iter().filter_map(|i| i.scores[idx]).collect(),
                summary: summary.clone(),
            })
            .collect();

        let matrix = &report.aggregates.correlation;
        let heatmap = Heatmap {
            labels: matrix.reviewers.clone(),
            z: matrix.values.clone(),
            zmin: -1.0,
            zmax: 1.0,
        };

        let means = &report.aggregates.category_means;
        let mut theta: Vec<String> = means.categories().map(String::from).collect();
        if let Some(first) = theta.first().cloned() {
            theta.push(first);
        }
        let radar = reviewers
            .iter()
            .enumerate()
            .map(|(idx, reviewer)| RadarTrace {
                name: reviewer.clone(),
                color: options.color_for(reviewer, idx),
                r: theta.iter().map(|c| means.get(c, reviewer)).collect(),
                theta: theta.clone(),
            })
            .collect();

        Self {
            score_axis: SCORE_AXIS,
            strip,
            boxes,
            heatmap,
            radar,
        }
    }
}
