//! Plain-text report for the terminal.

use super::{conclusions, RenderOptions, Renderer, Report};
use anyhow::Result;
use std::fmt::Write;

/// Width of the strip chart in characters.
const STRIP_WIDTH: usize = 37;

#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    options: RenderOptions,
}

impl TextRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn marker(reviewer: &str) -> char {
        reviewer
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }

    /// One strip-chart line over the 1..10 axis. Values off the axis are
    /// drawn at its edge.
    fn strip_line(report: &Report, row: usize) -> String {
        let mut line = vec!['.'; STRIP_WIDTH];
        let position = |value: f64| {
            let scaled = (value - 1.0) / 9.0 * (STRIP_WIDTH - 1) as f64;
            scaled.round().clamp(0.0, (STRIP_WIDTH - 1) as f64) as usize
        };

        let item = &report.items[row];
        if let Some(mean) = item.mean {
            line[position(mean)] = '|';
        }
        for (reviewer, score) in report.metadata.reviewers.iter().zip(&item.scores) {
            if let Some(score) = score {
                let slot = &mut line[position(*score)];
                *slot = if *slot == '.' || *slot == '|' {
                    Self::marker(reviewer)
                } else {
                    '*'
                };
            }
        }

        line.into_iter().collect()
    }
}

impl Renderer for TextRenderer {
    fn render(&self, report: &Report) -> Result<String> {
        let o = &self.options;
        let mut out = String::new();
        let name_width = report
            .items
            .iter()
            .map(|i| i.item_name.chars().count())
            .max()
            .unwrap_or(4)
            .max(4);

        writeln!(out, "Cheese-Tasting Report: {}", report.metadata.source)?;
        writeln!(
            out,
            "{} items, {} categories, reviewers: {}",
            report.metadata.item_count,
            report.metadata.category_count,
            report.metadata.reviewers.join(", ")
        )?;
        writeln!(out)?;

        writeln!(out, "Ratings (1 .. 10, | = mean, * = overlap)")?;
        for (row, item) in report.items.iter().enumerate() {
            writeln!(
                out,
                "  {:<width$}  {}  {:>6}",
                item.item_name,
                Self::strip_line(report, row),
                o.value(item.mean),
                width = name_width
            )?;
        }
        let legend: Vec<String> = report
            .metadata
            .reviewers
            .iter()
            .map(|r| format!("{} = {}", Self::marker(r), r))
            .collect();
        writeln!(out, "  {}", legend.join(", "))?;
        writeln!(out)?;

        writeln!(out, "Reviewers")?;
        for s in &report.aggregates.reviewer_summaries {
            writeln!(
                out,
                "  {:<12} mean {:>6}  sd {:>6}  median {:>6}  range {} - {}",
                s.reviewer,
                o.value(s.mean),
                o.value(s.std_dev),
                o.value(s.median),
                o.value(s.min),
                o.value(s.max)
            )?;
        }
        writeln!(out)?;

        writeln!(out, "Correlation")?;
        let matrix = &report.aggregates.correlation;
        for (i, j) in matrix.pairs() {
            writeln!(
                out,
                "  {} / {}: {}",
                matrix.reviewers[i],
                matrix.reviewers[j],
                o.value(matrix.values[i][j])
            )?;
        }
        writeln!(out)?;

        writeln!(out, "Category means")?;
        let means = &report.aggregates.category_means;
        for category in means.categories() {
            let cells: Vec<String> = report
                .metadata
                .reviewers
                .iter()
                .map(|r| format!("{} {}", r, o.value(means.get(category, r))))
                .collect();
            writeln!(
                out,
                "  {:<16} {}  (overall {})",
                category,
                cells.join("  "),
                o.value(means.category_mean(category))
            )?;
        }
        writeln!(out)?;

        writeln!(out, "Top picks")?;
        for reviewer in &report.top_picks {
            writeln!(out, "  {}", reviewer.reviewer)?;
            for pick in &reviewer.picks {
                writeln!(
                    out,
                    "    {}. {} ({}/10, price: {})",
                    pick.rank,
                    pick.item_name,
                    o.value(Some(pick.score)),
                    pick.catalog.price
                )?;
            }
        }

        if o.include_conclusions {
            writeln!(out)?;
            writeln!(out, "Conclusions")?;
            for line in conclusions(&report.aggregates.headline, o) {
                writeln!(out, "  - {}", line)?;
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_strip_line_positions() {
        let report = sample_report();
        // Gouda: all three reviewers at 6.0 collide on the mean
        let line = TextRenderer::strip_line(&report, 1);
        assert_eq!(line.chars().count(), STRIP_WIDTH);
        assert_eq!(line.chars().nth(20), Some('*'));
        assert!(!line.contains('|'));

        // Brie: A at 8, B at 9, C at 6, mean 7.67
        let line = TextRenderer::strip_line(&report, 0);
        assert_eq!(line.chars().nth(28), Some('A'));
        assert_eq!(line.chars().nth(32), Some('B'));
        assert_eq!(line.chars().nth(20), Some('C'));
        assert_eq!(line.chars().nth(27), Some('|'));
    }

    #[test]
    fn test_text_report_sections() {
        let report = sample_report();
        let text = TextRenderer::default().render(&report).unwrap();

        assert!(text.starts_with("Cheese-Tasting Report: ratings.csv"));
        assert!(text.contains("A / C: n/a"));
        assert!(text.contains("1. Brie (8.00/10, price: 2,99 € / 100 g)"));
        assert!(text.contains("Conclusions"));
    }
}
