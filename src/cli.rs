//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;

/// Tastingboard - statistics and reports for a cheese-tasting panel
///
/// Reads a tasting sheet (CSV or Excel/ODS) with one row per cheese and one
/// score column per reviewer, and writes a report with per-item means,
/// reviewer spreads, correlations, category means and top picks.
///
/// Examples:
///   tastingboard --input ECC_Kaese_Rating.xlsx
///   tastingboard --input ratings.csv --format text
///   tastingboard --input ratings.csv --reviewers Ann,Bo --top 5 -o report.md
///   cat ratings.csv | tastingboard --input - --format json
///   tastingboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Tasting sheet to read (`-` reads from stdin)
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Worksheet name for Excel/ODS input
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Reviewer columns (comma-separated)
    ///
    /// Example: --reviewers Maxi,Fabi,Julian
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub reviewers: Option<Vec<String>>,

    /// Header of the item-name column
    #[arg(long, value_name = "NAME")]
    pub item_column: Option<String>,

    /// Header of the category column
    #[arg(long, value_name = "NAME")]
    pub category_column: Option<String>,

    /// CSV field delimiter
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// Number of top items listed per reviewer
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Output format (markdown, json, text)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path for the report (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .tastingboard.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "TASTINGBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Leave the written conclusions out of the report
    #[arg(long)]
    pub no_conclusions: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .tastingboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON with chart-ready series
    Json,
    /// Plain terminal report
    Text,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the sheet comes from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input.as_deref().is_some_and(|p| p.as_os_str() == "-")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref reviewers) = self.reviewers {
            if reviewers.iter().any(|r| r.trim().is_empty()) {
                return Err("Reviewer names must not be empty".to_string());
            }
            let unique: HashSet<&str> = reviewers.iter().map(String::as_str).collect();
            if unique.len() != reviewers.len() {
                return Err("Reviewer names must be unique".to_string());
            }
        }

        if let Some(ref delimiter) = self.delimiter {
            if delimiter.len() != 1 {
                return Err("Delimiter must be a single ASCII character".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose` from the config file; `--quiet`
    /// still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from("ratings.csv")),
            sheet: None,
            reviewers: None,
            item_column: None,
            category_column: None,
            delimiter: None,
            top: None,
            format: OutputFormat::Markdown,
            output: None,
            config: None,
            no_conclusions: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "tastingboard",
            "--input",
            "ratings.xlsx",
            "--reviewers",
            "Ann,Bo",
            "-n",
            "5",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("ratings.xlsx")));
        assert_eq!(
            args.reviewers,
            Some(vec!["Ann".to_string(), "Bo".to_string()])
        );
        assert_eq!(args.top, Some(5));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_input_required_unless_init_config() {
        assert!(Args::try_parse_from(["tastingboard"]).is_err());
        assert!(Args::try_parse_from(["tastingboard", "--init-config"]).is_ok());
    }

    #[test]
    fn test_reads_stdin() {
        let mut args = make_args();
        assert!(!args.reads_stdin());
        args.input = Some(PathBuf::from("-"));
        assert!(args.reads_stdin());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_duplicate_reviewers() {
        let mut args = make_args();
        args.reviewers = Some(vec!["Ann".to_string(), "Ann".to_string()]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_delimiter() {
        let mut args = make_args();
        args.delimiter = Some(";;".to_string());
        assert!(args.validate().is_err());
        args.delimiter = Some(";".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_config_verbose() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
