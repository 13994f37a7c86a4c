//! Domain errors for loading and aggregating tasting tables.
//!
//! Loader and aggregator functions return [`TastingError`] so callers can
//! match on the failure kind; application glue wraps them in `anyhow`.

use thiserror::Error;

/// Everything that can go wrong between reading a tasting sheet and
/// computing its statistics.
#[derive(Debug, Error)]
pub enum TastingError {
    /// The source does not exist or cannot be opened.
    #[error("cannot open tasting sheet '{path}': {reason}")]
    MissingSource { path: String, reason: String },

    /// A required column is absent or a row violates the table layout.
    #[error("schema error: {0}")]
    Schema(String),

    /// The sheet has a header but no data rows.
    #[error("tasting sheet contains no data rows")]
    EmptyTable,

    /// A correlation was requested for a series without variance.
    #[error("correlation undefined: scores of '{reviewer}' have no variance")]
    DegenerateSeries { reviewer: String },

    /// The reviewer is not one of the table's fixed reviewers.
    #[error("unknown reviewer '{0}'")]
    UnknownReviewer(String),

    /// The same item appears on more than one row.
    #[error("item '{item}' is rated twice (rows {first} and {second})")]
    DuplicateItem {
        item: String,
        first: usize,
        second: usize,
    },

    /// A score cell holds something that is not a number.
    #[error("invalid score '{value}' for reviewer '{reviewer}' in row {row}")]
    InvalidScore {
        row: usize,
        reviewer: String,
        value: String,
    },

    #[error("spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

impl TastingError {
    /// Soft failures leave the caller in a usable state: an empty sheet means
    /// "no data yet", a degenerate series means a single undefined statistic.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            TastingError::EmptyTable | TastingError::DegenerateSeries { .. }
        )
    }

    /// Fatal failures must stop rendering of anything that depends on the table.
    pub fn is_fatal(&self) -> bool {
        !self.is_soft()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_and_fatal_classification() {
        assert!(TastingError::EmptyTable.is_soft());
        assert!(TastingError::DegenerateSeries {
            reviewer: "Maxi".to_string()
        }
        .is_soft());

        assert!(TastingError::Schema("missing column".to_string()).is_fatal());
        assert!(TastingError::UnknownReviewer("Nobody".to_string()).is_fatal());
        assert!(TastingError::MissingSource {
            path: "x.csv".to_string(),
            reason: "not found".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = TastingError::DuplicateItem {
            item: "Brie".to_string(),
            first: 2,
            second: 5,
        };
        assert_eq!(err.to_string(), "item 'Brie' is rated twice (rows 2 and 5)");

        let err = TastingError::UnknownReviewer("Nobody".to_string());
        assert_eq!(err.to_string(), "unknown reviewer 'Nobody'");
    }
}
