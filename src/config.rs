//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.tastingboard.toml` files.

use crate::catalog::CatalogEntry;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".tastingboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Sheet layout.
    #[serde(default)]
    pub data: DataConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Colors and chart tuning for the renderers.
    #[serde(default)]
    pub presentation: PresentationConfig,

    /// Commerce metadata keyed by item name.
    #[serde(default)]
    pub catalog: BTreeMap<String, CatalogEntry>,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path. Reports go to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Layout of the tasting sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Worksheet read from workbook files.
    #[serde(default = "default_sheet")]
    pub sheet: String,

    /// Header of the item-name column.
    #[serde(default = "default_item_column")]
    pub item_column: String,

    /// Header of the category column.
    #[serde(default = "default_category_column")]
    pub category_column: String,

    /// Reviewer columns, in display order.
    #[serde(default = "default_reviewers")]
    pub reviewers: Vec<String>,

    /// CSV field delimiter (first byte is used).
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sheet: default_sheet(),
            item_column: default_item_column(),
            category_column: default_category_column(),
            reviewers: default_reviewers(),
            delimiter: default_delimiter(),
        }
    }
}

fn default_sheet() -> String {
    "rawDaten".to_string()
}

fn default_item_column() -> String {
    "Käse".to_string()
}

fn default_category_column() -> String {
    "Kategorie".to_string()
}

fn default_reviewers() -> Vec<String> {
    vec!["Maxi", "Fabi", "Julian"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_delimiter() -> String {
    ",".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Items listed per reviewer in the top picks.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Write the conclusions section.
    #[serde(default = "default_true")]
    pub include_conclusions: bool,

    /// Decimal places for scores and statistics.
    #[serde(default = "default_decimals")]
    pub decimals: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            include_conclusions: true,
            decimals: default_decimals(),
        }
    }
}

fn default_top_n() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_decimals() -> usize {
    2
}

/// Presentation settings shared by all renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Color of the mean trace.
    #[serde(default = "default_mean_color")]
    pub mean_color: String,

    /// Horizontal offsets applied per reviewer in the strip chart, cycled
    /// when there are more reviewers than offsets.
    #[serde(default = "default_jitter")]
    pub jitter: Vec<f64>,

    /// Reviewer name to hex color.
    #[serde(default = "default_colors")]
    pub colors: BTreeMap<String, String>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            mean_color: default_mean_color(),
            jitter: default_jitter(),
            colors: default_colors(),
        }
    }
}

fn default_mean_color() -> String {
    "#000000".to_string()
}

fn default_jitter() -> Vec<f64> {
    vec![-0.15, 0.0, 0.15]
}

fn default_colors() -> BTreeMap<String, String> {
    [
        ("Maxi", "#FF7F0E"),
        ("Fabi", "#1F77B4"),
        ("Julian", "#2CA02C"),
    ]
    .into_iter()
    .map(|(name, color)| (name.to_string(), color.to_string()))
    .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref sheet) = args.sheet {
            self.data.sheet = sheet.clone();
        }
        if let Some(ref column) = args.item_column {
            self.data.item_column = column.clone();
        }
        if let Some(ref column) = args.category_column {
            self.data.category_column = column.clone();
        }
        if let Some(ref reviewers) = args.reviewers {
            self.data.reviewers = reviewers.clone();
        }
        if let Some(ref delimiter) = args.delimiter {
            self.data.delimiter = delimiter.clone();
        }

        if let Some(top) = args.top {
            self.report.top_n = top;
        }
        if args.no_conclusions {
            self.report.include_conclusions = false;
        }

        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
