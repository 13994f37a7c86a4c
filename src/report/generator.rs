//! Markdown and JSON report generation.
//!
//! This module generates the Markdown tasting report and the JSON export
//! from an assembled [`Report`].

use super::charts::ChartSet;
use super::{conclusions, RenderOptions, Renderer, Report, ReportMetadata, NOT_AVAILABLE};
use crate::analysis::Aggregates;
use crate::models::CorrelationMatrix;
use anyhow::Result;
use serde::Serialize;

/// Renders the full Markdown report.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, report: &Report) -> Result<String> {
        Ok(generate_markdown_report(report, &self.options))
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# Cheese-Tasting Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(options));
    output.push_str(&generate_ratings_section(report, options));
    output.push_str(&generate_reviewers_section(&report.aggregates, options));
    output.push_str(&generate_correlation_section(
        &report.aggregates.correlation,
        options,
    ));
    output.push_str(&generate_categories_section(report, options));
    output.push_str(&generate_top_picks_section(report, options));

    if options.include_conclusions {
        output.push_str(&generate_conclusions_section(report, options));
    }

    output.push_str(&generate_footer(&report.metadata, options));

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Reviewers:** {}\n",
        metadata.reviewers.join(", ")
    ));
    section.push_str(&format!("- **Items:** {}\n", metadata.item_count));
    section.push_str(&format!("- **Categories:** {}\n", metadata.category_count));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(options: &RenderOptions) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Ratings](#ratings)\n");
    toc.push_str("- [Reviewers](#reviewers)\n");
    toc.push_str("- [Correlation](#correlation)\n");
    toc.push_str("- [Categories](#categories)\n");
    toc.push_str("- [Top Picks](#top-picks)\n");
    if options.include_conclusions {
        toc.push_str("- [Conclusions](#conclusions)\n");
    }
    toc.push('\n');

    toc
}

/// Table header row plus alignment row.
fn table_header(columns: &[&str]) -> String {
    let mut header = format!("| {} |\n", columns.join(" | "));
    header.push('|');
    for (i, _) in columns.iter().enumerate() {
        header.push_str(if i == 0 { ":---|" } else { ":---:|" });
    }
    header.push('\n');
    header
}

/// Generate the per-item ratings table.
fn generate_ratings_section(report: &Report, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Ratings\n\n");

    let mut columns = vec!["Item", "Category"];
    columns.extend(report.metadata.reviewers.iter().map(String::as_str));
    columns.push("**Mean**");
    section.push_str(&table_header(&columns));

    for item in &report.items {
        let scores: Vec<String> = item.scores.iter().map(|s| options.value(*s)).collect();
        section.push_str(&format!(
            "| {} | {} | {} | **{}** |\n",
            item.item_name,
            item.category,
            scores.join(" | "),
            options.value(item.mean)
        ));
    }
    section.push('\n');

    section
}

/// Generate the reviewer distribution table (the box-plot numbers).
fn generate_reviewers_section(aggregates: &Aggregates, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Reviewers\n\n");
    section.push_str(&table_header(&[
        "Reviewer", "Scores", "Mean", "SD", "Min", "Q1", "Median", "Q3", "Max",
    ]));

    for s in &aggregates.reviewer_summaries {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            s.reviewer,
            s.count,
            options.value(s.mean),
            options.value(s.std_dev),
            options.value(s.min),
            options.value(s.q1),
            options.value(s.median),
            options.value(s.q3),
            options.value(s.max),
        ));
    }
    section.push('\n');

    section
}

/// Generate the correlation table.
fn generate_correlation_section(matrix: &CorrelationMatrix, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Correlation\n\n");

    let mut columns = vec![""];
    columns.extend(matrix.reviewers.iter().map(String::as_str));
    section.push_str(&table_header(&columns));

    for (reviewer, row) in matrix.reviewers.iter().zip(&matrix.values) {
        let cells: Vec<String> = row.iter().map(|r| options.value(*r)).collect();
        section.push_str(&format!("| **{}** | {} |\n", reviewer, cells.join(" | ")));
    }
    section.push('\n');

    if matrix.values.iter().flatten().any(Option::is_none) {
        section.push_str(&format!(
            "*{}: correlation undefined (constant scores or too few shared ratings).*\n\n",
            NOT_AVAILABLE
        ));
    }

    section
}

/// Generate the category means table.
fn generate_categories_section(report: &Report, options: &RenderOptions) -> String {
    let mut section = String::new();
    let means = &report.aggregates.category_means;

    section.push_str("## Categories\n\n");

    let mut columns = vec!["Category"];
    columns.extend(report.metadata.reviewers.iter().map(String::as_str));
    columns.push("**Mean**");
    section.push_str(&table_header(&columns));

    for category in means.categories() {
        let cells: Vec<String> = report
            .metadata
            .reviewers
            .iter()
            .map(|r| options.value(means.get(category, r)))
            .collect();
        section.push_str(&format!(
            "| {} | {} | **{}** |\n",
            category,
            cells.join(" | "),
            options.value(means.category_mean(category))
        ));
    }
    section.push('\n');

    section
}

/// Generate the top picks per reviewer.
fn generate_top_picks_section(report: &Report, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Top Picks\n\n");

    for reviewer in &report.top_picks {
        section.push_str(&format!("### {}\n\n", reviewer.reviewer));

        if reviewer.picks.is_empty() {
            section.push_str("*No ratings.*\n\n");
            continue;
        }

        for pick in &reviewer.picks {
            let name = match pick.catalog.link {
                Some(ref url) => format!("[{}]({})", pick.item_name, url),
                None => pick.item_name.clone(),
            };
            section.push_str(&format!(
                "{}. **{}** - {}/10 - Price: {}\n",
                pick.rank,
                name,
                options.value(Some(pick.score)),
                pick.catalog.price
            ));
            if let Some(ref img) = pick.catalog.image {
                section.push_str(&format!("\n   ![{}]({})\n", pick.item_name, img));
            }
        }
        section.push('\n');
    }

    section
}

/// Generate the written conclusions.
fn generate_conclusions_section(report: &Report, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Conclusions\n\n");
    for line in conclusions(&report.aggregates.headline, options) {
        section.push_str(&format!("- {}\n", line));
    }
    section.push('\n');

    section
}

/// Generate the report footer with the color legend.
fn generate_footer(metadata: &ReportMetadata, options: &RenderOptions) -> String {
    let mut footer = String::new();

    let legend: Vec<String> = metadata
        .reviewers
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{} `{}`", r, options.color_for(r, i)))
        .collect();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Colors: {}, mean `{}`*\n",
        legend.join(", "),
        options.mean_color
    ));

    footer
}

/// JSON export: the report plus chart-ready series.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer {
    options: RenderOptions,
}

impl JsonRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    report: &'a Report,
    charts: ChartSet,
}

impl Renderer for JsonRenderer {
    fn render(&self, report: &Report) -> Result<String> {
        generate_json_report(report, &self.options)
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report, options: &RenderOptions) -> Result<String> {
    let export = JsonExport {
        report,
        charts: ChartSet::build(report, options),
    };
    serde_json::to_string_pretty(&export).map_err(Into::into)
}
