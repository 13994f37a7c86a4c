//! Report assembly and rendering.
//!
//! A [`Report`] bundles the loaded table, its aggregates and the catalog
//! data of the top picks. Each output surface implements [`Renderer`].

pub mod charts;
pub mod generator;
pub mod terminal;

pub use generator::{JsonRenderer, MarkdownRenderer};
pub use terminal::TextRenderer;

use crate::analysis::Aggregates;
use crate::catalog::{CatalogLookup, CatalogView};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::models::{HeadlineFacts, TastingTable};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Text shown for undefined values.
pub const NOT_AVAILABLE: &str = "n/a";

/// Fallback palette for reviewers without a configured color.
const PALETTE: &[&str] = &["#FF7F0E", "#1F77B4", "#2CA02C", "#D62728", "#9467BD", "#8C564B"];

/// Metadata about the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Name of the tasting sheet.
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub reviewers: Vec<String>,
    pub item_count: usize,
    pub category_count: usize,
}

/// One table row with its appended mean.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRow {
    pub item_name: String,
    pub category: String,
    pub scores: Vec<Option<f64>>,
    pub mean: Option<f64>,
}

/// A ranked item with its catalog data.
#[derive(Debug, Clone, Serialize)]
pub struct TopPick {
    pub rank: usize,
    pub item_name: String,
    pub score: f64,
    pub catalog: CatalogView,
}

/// Top picks of one reviewer.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewerPicks {
    pub reviewer: String,
    pub picks: Vec<TopPick>,
}

/// Everything a renderer needs.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub items: Vec<ItemRow>,
    pub aggregates: Aggregates,
    pub top_picks: Vec<ReviewerPicks>,
}

/// Build a report, enriching top picks from the catalog.
pub fn build_report(
    source: &str,
    table: &TastingTable,
    aggregates: Aggregates,
    catalog: &dyn CatalogLookup,
) -> Report {
    let items = table
        .records()
        .iter()
        .zip(&aggregates.row_means)
        .map(|(record, mean)| ItemRow {
            item_name: record.item_name.clone(),
            category: record.category.clone(),
            scores: record.scores.clone(),
            mean: *mean,
        })
        .collect();

    let top_picks = aggregates
        .top_picks
        .iter()
        .map(|top| ReviewerPicks {
            reviewer: top.reviewer.clone(),
            picks: top
                .entries
                .iter()
                .enumerate()
                .map(|(i, entry)| TopPick {
                    rank: i + 1,
                    item_name: entry.item_name.clone(),
                    score: entry.score,
                    catalog: CatalogView::resolve(catalog, &entry.item_name),
                })
                .collect(),
        })
        .collect();

    let metadata = ReportMetadata {
        source: source.to_string(),
        generated_at: Utc::now(),
        reviewers: table.reviewers().to_vec(),
        item_count: table.len(),
        category_count: aggregates.category_means.means.len(),
    };

    Report {
        metadata,
        items,
        aggregates,
        top_picks,
    }
}

/// Presentation settings handed to the renderers.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub decimals: usize,
    pub include_conclusions: bool,
    pub colors: BTreeMap<String, String>,
    pub mean_color: String,
    pub jitter: Vec<f64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        Self {
            decimals: config.report.decimals,
            include_conclusions: config.report.include_conclusions,
            colors: config.presentation.colors.clone(),
            mean_color: config.presentation.mean_color.clone(),
            jitter: config.presentation.jitter.clone(),
        }
    }
}

impl RenderOptions {
    /// Configured color of a reviewer, or a palette color by position.
    pub fn color_for(&self, reviewer: &str, index: usize) -> String {
        self.colors
            .get(reviewer)
            .cloned()
            .unwrap_or_else(|| PALETTE[index % PALETTE.len()].to_string())
    }

    /// Strip-chart offset of the reviewer at `index`.
    pub fn jitter_for(&self, index: usize) -> f64 {
        if self.jitter.is_empty() {
            0.0
        } else {
            self.jitter[index % self.jitter.len()]
        }
    }

    /// Format a value, or `n/a` when undefined.
    pub fn value(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{:.*}", self.decimals, v),
            None => NOT_AVAILABLE.to_string(),
        }
    }
}

/// An output surface for reports.
pub trait Renderer {
    fn render(&self, report: &Report) -> Result<String>;
}

/// Pick the renderer for an output format.
pub fn renderer_for(format: OutputFormat, options: RenderOptions) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Markdown => Box::new(MarkdownRenderer::new(options)),
        OutputFormat::Json => Box::new(JsonRenderer::new(options)),
        OutputFormat::Text => Box::new(TextRenderer::new(options)),
    }
}

/// Written conclusions derived from the headline facts.
pub fn conclusions(facts: &HeadlineFacts, options: &RenderOptions) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(ref best) = facts.best_item {
        lines.push(format!(
            "Best rated overall: {} (mean {})",
            best.name,
            options.value(Some(best.value))
        ));
    }
    if let Some(ref worst) = facts.worst_item {
        lines.push(format!(
            "Lowest rated overall: {} (mean {})",
            worst.name,
            options.value(Some(worst.value))
        ));
    }
    if let Some(ref best) = facts.best_category {
        lines.push(format!(
            "Favourite category: {} (mean {})",
            best.name,
            options.value(Some(best.value))
        ));
    }
    if let Some(ref worst) = facts.worst_category {
        lines.push(format!(
            "Least liked category: {} (mean {})",
            worst.name,
            options.value(Some(worst.value))
        ));
    }
    if let Some(ref steady) = facts.most_consistent {
        lines.push(format!(
            "Most consistent reviewer: {} (sd {})",
            steady.name,
            options.value(Some(steady.value))
        ));
    }
    if let Some(ref spread) = facts.least_consistent {
        lines.push(format!(
            "Widest spread of scores: {} (sd {})",
            spread.name,
            options.value(Some(spread.value))
        ));
    }
    match facts.most_correlated {
        Some(ref pair) => lines.push(format!(
            "Strongest agreement: {} and {} (r = {})",
            pair.first,
            pair.second,
            options.value(Some(pair.correlation))
        )),
        None => lines.push(format!("Strongest agreement: {}", NOT_AVAILABLE)),
    }

    lines
}
