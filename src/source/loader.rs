//! Reading raw sheets from CSV and workbook files, and turning them into
//! validated tasting tables.

use super::TableLayout;
use crate::error::TastingError;
use crate::models::{TastingRecord, TastingTable};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, warn};

/// A single cell before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
}

impl RawCell {
    /// Cell from free text; blank text becomes `Empty`.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawCell::Empty)
    }

    /// Cell content as a label (item or category name).
    fn as_label(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Number(n) => Some(n.to_string()),
            RawCell::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&Data> for RawCell {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => RawCell::Empty,
            Data::Float(f) => RawCell::Number(*f),
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::String(s) => RawCell::from_text(s),
            other => RawCell::from_text(&other.to_string()),
        }
    }
}

/// Header row plus data rows, as read from the file.
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

fn missing_source(path: &Path, reason: impl ToString) -> TastingError {
    TastingError::MissingSource {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Read delimited text. The first record is the header.
pub fn read_csv<R: Read>(reader: R, delimiter: u8) -> Result<RawSheet, TastingError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.iter().map(normalize_header).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(RawCell::from_text).collect());
    }

    Ok(RawSheet { headers, rows })
}

/// Read a CSV file from disk.
pub fn read_csv_path(path: &Path, delimiter: u8) -> Result<RawSheet, TastingError> {
    let file = File::open(path).map_err(|e| missing_source(path, e))?;
    read_csv(file, delimiter)
}

/// Read one worksheet of a workbook file.
pub fn read_workbook_path(path: &Path, sheet: &str) -> Result<RawSheet, TastingError> {
    if !path.is_file() {
        return Err(missing_source(path, "no such file"));
    }

    let workbook = open_workbook_auto(path).map_err(|e| match e {
        calamine::Error::Io(io) => missing_source(path, io),
        other => TastingError::Spreadsheet(other),
    })?;
    read_worksheet(workbook, sheet)
}

/// Read one worksheet of a workbook held in memory.
pub fn read_workbook_bytes(bytes: Vec<u8>, sheet: &str) -> Result<RawSheet, TastingError> {
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    read_worksheet(workbook, sheet)
}

fn read_worksheet<RS: Read + Seek>(
    mut workbook: Sheets<RS>,
    sheet: &str,
) -> Result<RawSheet, TastingError> {
    let names = workbook.sheet_names();
    let target = if names.iter().any(|n| n == sheet) {
        sheet.to_string()
    } else {
        match names.first() {
            Some(first) => {
                warn!("Sheet '{}' not found, reading '{}' instead", sheet, first);
                first.clone()
            }
            None => return Err(TastingError::Schema("workbook has no sheets".to_string())),
        }
    };

    let range = workbook.worksheet_range(&target)?;
    let mut rows = range.rows();

    let headers = match rows.next() {
        Some(header) => header
            .iter()
            .map(|cell| normalize_header(&cell.to_string()))
            .collect(),
        None => Vec::new(),
    };
    let rows: Vec<Vec<RawCell>> = rows
        .map(|row| row.iter().map(RawCell::from).collect())
        .collect();

    debug!("Sheet '{}': {} columns, {} rows", target, headers.len(), rows.len());
    Ok(RawSheet { headers, rows })
}

/// Validate a raw sheet against the layout and build the table.
///
/// Row numbers in errors are sheet lines, header being line 1.
pub fn build_table(raw: &RawSheet, layout: &TableLayout) -> Result<TastingTable, TastingError> {
    if layout.reviewers.is_empty() {
        return Err(TastingError::Schema(
            "no reviewer columns configured".to_string(),
        ));
    }

    let find = |name: &str| {
        raw.headers.iter().position(|h| h == name).ok_or_else(|| {
            TastingError::Schema(format!(
                "missing column '{}' (found: {})",
                name,
                raw.headers.join(", ")
            ))
        })
    };

    let item_col = find(layout.item_column.as_str())?;
    let category_col = find(layout.category_column.as_str())?;
    let reviewer_cols = layout
        .reviewers
        .iter()
        .map(|r| find(r.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    let empty = RawCell::Empty;
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut records = Vec::new();

    for (idx, row) in raw.rows.iter().enumerate() {
        let line = idx + 2;
        if row.iter().all(RawCell::is_empty) {
            continue;
        }
        let cell = |col: usize| row.get(col).unwrap_or(&empty);

        let item_name = cell(item_col).as_label().ok_or_else(|| {
            TastingError::Schema(format!("row {}: empty '{}'", line, layout.item_column))
        })?;
        let category = cell(category_col).as_label().ok_or_else(|| {
            TastingError::Schema(format!(
                "row {}: empty '{}'",
                line, layout.category_column
            ))
        })?;

        if let Some(first) = seen.insert(item_name.clone(), line) {
            return Err(TastingError::DuplicateItem {
                item: item_name,
                first,
                second: line,
            });
        }

        let scores = reviewer_cols
            .iter()
            .zip(&layout.reviewers)
            .map(|(&col, reviewer)| parse_score(cell(col), line, reviewer))
            .collect::<Result<Vec<_>, _>>()?;

        records.push(TastingRecord {
            item_name,
            category,
            scores,
        });
    }

    if records.is_empty() {
        return Err(TastingError::EmptyTable);
    }

    TastingTable::new(layout.reviewers.clone(), records)
}

/// Interpret a score cell. Blank and NaN cells are missing scores.
fn parse_score(cell: &RawCell, row: usize, reviewer: &str) -> Result<Option<f64>, TastingError> {
    let invalid = |value: String| TastingError::InvalidScore {
        row,
        reviewer: reviewer.to_string(),
        value,
    };

    let value = match cell {
        RawCell::Empty => return Ok(None),
        RawCell::Number(n) => *n,
        // Decimal commas are common in exported sheets.
        RawCell::Text(s) => s
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| invalid(s.clone()))?,
    };

    if value.is_nan() {
        Ok(None)
    } else if value.is_infinite() {
        Err(invalid(value.to_string()))
    } else {
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TableLayout {
        TableLayout {
            sheet: "rawDaten".to_string(),
            item_column: "Käse".to_string(),
            category_column: "Kategorie".to_string(),
            reviewers: vec!["Maxi".to_string(), "Fabi".to_string()],
            delimiter: b';',
        }
    }

    fn sheet(text: &str) -> RawSheet {
        read_csv(text.as_bytes(), b';').unwrap()
    }

    #[test]
    fn test_read_csv_trims_headers_and_cells() {
        let raw = sheet("\u{feff}Käse ; Kategorie;Maxi;Fabi\n Brie ;Weich; 8 ;9\n");
        assert_eq!(raw.headers, vec!["Käse", "Kategorie", "Maxi", "Fabi"]);
        assert_eq!(raw.rows[0][0], RawCell::Text("Brie".to_string()));
        assert_eq!(raw.rows[0][2], RawCell::Text("8".to_string()));
    }

    #[test]
    fn test_build_table_with_extra_columns_and_decimal_commas() {
        let raw = sheet(
            "Nr;Käse;Kategorie;Maxi;Fabi;Notiz\n\
             1;Brie;Weich;7,5;9;lecker\n\
             2;Gouda;Hart;6;;\n",
        );
        let table = build_table(&raw, &layout()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].scores, vec![Some(7.5), Some(9.0)]);
        assert_eq!(table.records()[1].scores, vec![Some(6.0), None]);
        assert_eq!(table.records()[1].category, "Hart");
    }

    #[test]
    fn test_build_table_skips_blank_rows() {
        let raw = sheet("Käse;Kategorie;Maxi;Fabi\n;;;\nBrie;Weich;8;9\n;;;\n");
        let table = build_table(&raw, &layout()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_build_table_missing_reviewer_column() {
        let raw = sheet("Käse;Kategorie;Maxi\nBrie;Weich;8\n");
        let err = build_table(&raw, &layout()).unwrap_err();
        assert!(matches!(err, TastingError::Schema(ref msg) if msg.contains("'Fabi'")));
    }

    #[test]
    fn test_build_table_duplicate_item_reports_lines() {
        let raw = sheet("Käse;Kategorie;Maxi;Fabi\nBrie;Weich;8;9\nGouda;Hart;6;6\nBrie;Weich;5;5\n");
        let err = build_table(&raw, &layout()).unwrap_err();
        match err {
            TastingError::DuplicateItem { item, first, second } => {
                assert_eq!(item, "Brie");
                assert_eq!(first, 2);
                assert_eq!(second, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_table_invalid_score() {
        let raw = sheet("Käse;Kategorie;Maxi;Fabi\nBrie;Weich;gut;9\n");
        let err = build_table(&raw, &layout()).unwrap_err();
        match err {
            TastingError::InvalidScore { row, reviewer, value } => {
                assert_eq!(row, 2);
                assert_eq!(reviewer, "Maxi");
                assert_eq!(value, "gut");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_table_empty_item_name() {
        let raw = sheet("Käse;Kategorie;Maxi;Fabi\n;Weich;8;9\n");
        let err = build_table(&raw, &layout()).unwrap_err();
        assert!(matches!(err, TastingError::Schema(_)));
    }

    #[test]
    fn test_build_table_keeps_out_of_range_scores() {
        let raw = sheet("Käse;Kategorie;Maxi;Fabi\nBrie;Weich;0;15\n");
        let table = build_table(&raw, &layout()).unwrap();
        assert_eq!(table.records()[0].scores, vec![Some(0.0), Some(15.0)]);
    }

    #[test]
    fn test_build_table_nan_is_missing() {
        let raw = sheet("Käse;Kategorie;Maxi;Fabi\nBrie;Weich;NaN;4\n");
        let table = build_table(&raw, &layout()).unwrap();
        assert_eq!(table.records()[0].scores, vec![None, Some(4.0)]);
    }

    #[test]
    fn test_short_rows_are_padded_with_empty_cells() {
        let raw = sheet("Käse;Kategorie;Maxi;Fabi\nBrie;Weich;8\n");
        let table = build_table(&raw, &layout()).unwrap();
        assert_eq!(table.records()[0].scores, vec![Some(8.0), None]);
    }

    #[test]
    fn test_raw_cell_from_workbook_data() {
        assert_eq!(RawCell::from(&Data::Int(7)), RawCell::Number(7.0));
        assert_eq!(RawCell::from(&Data::Float(6.5)), RawCell::Number(6.5));
        assert_eq!(RawCell::from(&Data::Empty), RawCell::Empty);
        assert_eq!(
            RawCell::from(&Data::String("  Brie ".to_string())),
            RawCell::Text("Brie".to_string())
        );
    }

    #[test]
    fn test_read_workbook_cells() {
        let bytes = include_bytes!("../../demos/tasting.xlsx").to_vec();
        let raw = read_workbook_bytes(bytes, "rawDaten").unwrap();

        assert_eq!(raw.headers, vec!["Käse", "Kategorie", "Maxi", "Fabi", "Julian"]);
        assert_eq!(raw.rows.len(), 4);
        assert_eq!(raw.rows[0][0], RawCell::Text("Mammutkäse".to_string()));
        assert_eq!(raw.rows[0][2], RawCell::Number(8.0));
        assert_eq!(raw.rows[0][3], RawCell::Number(7.5));
        assert!(raw.rows[1].iter().all(RawCell::is_empty));
        assert_eq!(raw.rows[2][4], RawCell::Empty);
    }
}
