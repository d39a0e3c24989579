//! I/O error types for sapling-io.

use std::path::PathBuf;

/// Errors from reading and validating a labelled CSV file.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the file holds no data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a row cannot hold both a label and at least one feature.
    #[error("row {row_index} in {path} has {got} column(s), need at least 2")]
    TooFewColumns {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// Number of columns in the row.
        got: usize,
    },

    /// Returned when a row has a different number of columns than the first row.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// Column count of the first row.
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a cell is NaN, infinite, or not a float at all.
    #[error("non-finite value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// Zero-based column index in the file.
        col_index: usize,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when the label cell is not a non-negative integer.
    #[error("invalid label in {path}: row {row_index}, raw value \"{raw}\" is not a non-negative integer")]
    InvalidLabel {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// The raw label cell.
        raw: String,
    },

    /// Returned when a label column tag is not recognised.
    #[error("unsupported label column \"{tag}\": expected one of first, last")]
    InvalidLabelColumn {
        /// The rejected tag.
        tag: String,
    },
}
