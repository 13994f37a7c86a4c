//! Tasting sheet sources.
//!
//! A sheet is read from a file path or from bytes already in memory (an
//! uploaded file, stdin) and validated against the configured
//! [`TableLayout`] before it becomes a [`TastingTable`].

pub mod loader;

use crate::error::TastingError;
use crate::models::TastingTable;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a tasting sheet comes from.
#[derive(Debug, Clone)]
pub enum TableSource {
    /// A file on disk.
    Path(PathBuf),
    /// An in-memory file. `name` is used for format detection and messages.
    Bytes { name: String, bytes: Vec<u8> },
}

impl TableSource {
    /// Human-readable name of the source.
    pub fn name(&self) -> String {
        match self {
            TableSource::Path(path) => path.display().to_string(),
            TableSource::Bytes { name, .. } => name.clone(),
        }
    }

    /// Detected file format.
    pub fn format(&self) -> SourceFormat {
        match self {
            TableSource::Path(path) => {
                SourceFormat::from_extension(path).unwrap_or(SourceFormat::Csv)
            }
            TableSource::Bytes { name, bytes } => SourceFormat::from_extension(Path::new(name))
                .unwrap_or_else(|| SourceFormat::sniff(bytes)),
        }
    }
}

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text.
    Csv,
    /// Excel or OpenDocument workbook.
    Spreadsheet,
}

impl SourceFormat {
    /// Format implied by a file extension, if it is a known one.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Some(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Spreadsheet),
            _ => None,
        }
    }

    /// Guess the format from leading magic bytes (zip or OLE containers).
    pub fn sniff(bytes: &[u8]) -> Self {
        const ZIP: &[u8] = b"PK\x03\x04";
        const OLE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

        if bytes.starts_with(ZIP) || bytes.starts_with(OLE) {
            SourceFormat::Spreadsheet
        } else {
            SourceFormat::Csv
        }
    }
}

/// Column layout of a tasting sheet.
#[derive(Debug, Clone)]
pub struct TableLayout {
    /// Worksheet to read from workbooks.
    pub sheet: String,
    /// Header of the item-name column.
    pub item_column: String,
    /// Header of the category column.
    pub category_column: String,
    /// Reviewer columns, in display order.
    pub reviewers: Vec<String>,
    /// Field delimiter for CSV input.
    pub delimiter: u8,
}

impl TryFrom<&crate::config::DataConfig> for TableLayout {
    type Error = TastingError;

    /// Fails with `Schema` unless the delimiter is exactly one ASCII character.
    fn try_from(config: &crate::config::DataConfig) -> Result<Self, Self::Error> {
        let delimiter = match config.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => *byte,
            _ => {
                return Err(TastingError::Schema(format!(
                    "delimiter must be a single ASCII character, got '{}'",
                    config.delimiter
                )))
            }
        };

        Ok(Self {
            sheet: config.sheet.clone(),
            item_column: config.item_column.clone(),
            category_column: config.category_column.clone(),
            reviewers: config.reviewers.clone(),
            delimiter,
        })
    }
}

/// Load and validate a tasting table.
///
/// Fails with `MissingSource` when the source cannot be opened, `Schema`
/// when a required column is absent and `EmptyTable` when no data rows
/// remain after skipping blank lines.
pub fn load(source: &TableSource, layout: &TableLayout) -> Result<TastingTable, TastingError> {
    let format = source.format();
    debug!("Reading {} as {:?}", source.name(), format);

    let raw = match (source, format) {
        (TableSource::Path(path), SourceFormat::Csv) => {
            loader::read_csv_path(path, layout.delimiter)?
        }
        (TableSource::Path(path), SourceFormat::Spreadsheet) => {
            loader::read_workbook_path(path, &layout.sheet)?
        }
        (TableSource::Bytes { bytes, .. }, SourceFormat::Csv) => {
            loader::read_csv(bytes.as_slice(), layout.delimiter)?
        }
        (TableSource::Bytes { bytes, .. }, SourceFormat::Spreadsheet) => {
            loader::read_workbook_bytes(bytes.clone(), &layout.sheet)?
        }
    };

    let table = loader::build_table(&raw, layout)?;
    info!(
        "Loaded {} items rated by {} reviewers from {}",
        table.len(),
        table.reviewers().len(),
        source.name()
    );

    Ok(table)
}
