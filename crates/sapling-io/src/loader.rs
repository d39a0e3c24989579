//! Headerless numeric CSV loader with full input validation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{LabelColumn, LabelledData};

/// Reads a labelled sample matrix from a CSV file.
///
/// Expected CSV format:
/// - No header; comma separated; no quoting
/// - One sample per line, blank lines skipped
/// - Every row has the same number of columns, at least 2
/// - Every cell is a finite float; the label cell is a non-negative integer
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows |
/// | [`IoError::TooFewColumns`] | A row has fewer than 2 columns |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than the first row |
/// | [`IoError::NonFiniteValue`] | Feature cell is NaN, Inf, or unparseable float |
/// | [`IoError::InvalidLabel`] | Label cell is not a non-negative integer |
pub struct CsvLoader {
    path: PathBuf,
    label_column: LabelColumn,
}

impl CsvLoader {
    /// Create a new loader for the given CSV file path.
    pub fn new(path: &Path, label_column: LabelColumn) -> Self {
        Self {
            path: path.to_path_buf(),
            label_column,
        }
    }

    /// Read and validate the CSV file, returning a [`LabelledData`].
    #[instrument(skip(self), fields(path = %self.path.display(), label_column = %self.label_column))]
    pub fn read(&self) -> Result<LabelledData, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets ragged rows reach our own InconsistentRowLength check.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut expected_cols = None;

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() < 2 {
                return Err(IoError::TooFewColumns {
                    path: self.path.clone(),
                    row_index,
                    got: record.len(),
                });
            }
            let expected = *expected_cols.get_or_insert(record.len());
            if record.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }

            let label_index = self.label_column.index(expected);
            let mut row = Vec::with_capacity(expected - 1);
            for (col_index, raw) in record.iter().enumerate() {
                if col_index == label_index {
                    labels.push(self.parse_label(raw, row_index)?);
                } else {
                    row.push(self.parse_value(raw, row_index, col_index)?);
                }
            }
            features.push(row);
        }

        if features.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let data = LabelledData::new(features, labels);
        debug!(
            positives = data.labels().iter().filter(|&&l| l == 1).count(),
            "label distribution"
        );
        info!(
            n_samples = data.n_samples(),
            n_features = data.n_features(),
            "dataset loaded"
        );

        Ok(data)
    }

    fn parse_value(&self, raw: &str, row_index: usize, col_index: usize) -> Result<f64, IoError> {
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(IoError::NonFiniteValue {
                path: self.path.clone(),
                row_index,
                col_index,
                raw: raw.to_string(),
            }),
        }
    }

    /// Labels may be written as `1` or `1.0`, but never `1.5` or `-1`.
    fn parse_label(&self, raw: &str, row_index: usize) -> Result<usize, IoError> {
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 && value.fract() == 0.0 => {
                Ok(value as usize)
            }
            _ => Err(IoError::InvalidLabel {
                path: self.path.clone(),
                row_index,
                raw: raw.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    fn load(content: &str, label_column: LabelColumn) -> Result<LabelledData, IoError> {
        let f = write_csv(content);
        CsvLoader::new(f.path(), label_column).read()
    }

    #[test]
    fn read_label_last() {
        let data = load("0.5,1.5,1\n2.5,3.5,0\n4.0,5.0,1\n", LabelColumn::Last).unwrap();
        assert_eq!(data.n_samples(), 3);
        assert_eq!(data.n_features(), 2);
        assert_eq!(data.features()[1], vec![2.5, 3.5]);
        assert_eq!(data.labels(), &[1, 0, 1]);
    }

    #[test]
    fn read_label_first() {
        let data = load("1,0.5,1.5\n0,2.5,3.5\n", LabelColumn::First).unwrap();
        assert_eq!(data.features()[0], vec![0.5, 1.5]);
        assert_eq!(data.labels(), &[1, 0]);
    }

    #[test]
    fn value_round_trip() {
        let data = load("1.23456789,9.87654321,0\n", LabelColumn::Last).unwrap();
        let row = &data.features()[0];
        assert!((row[0] - 1.23456789).abs() < 1e-12);
        assert!((row[1] - 9.87654321).abs() < 1e-12);
    }

    #[test]
    fn blank_lines_skipped() {
        let data = load("1.0,0\n\n2.0,1\n\n", LabelColumn::Last).unwrap();
        assert_eq!(data.n_samples(), 2);
        assert_eq!(data.labels(), &[0, 1]);
    }

    #[test]
    fn surrounding_whitespace_trimmed() {
        let data = load(" 1.0 , 2.0 , 1 \n", LabelColumn::Last).unwrap();
        assert_eq!(data.features()[0], vec![1.0, 2.0]);
        assert_eq!(data.labels(), &[1]);
    }

    #[test]
    fn float_formatted_label_accepted() {
        let data = load("3.0,1.0\n4.0,0.0\n", LabelColumn::Last).unwrap();
        assert_eq!(data.labels(), &[1, 0]);
    }

    #[test]
    fn file_not_found() {
        let err = CsvLoader::new(Path::new("/nonexistent/path/data.csv"), LabelColumn::Last)
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn empty_file() {
        let err = load("", LabelColumn::Last).unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn single_column_rejected() {
        let err = load("1\n0\n", LabelColumn::Last).unwrap_err();
        assert!(matches!(err, IoError::TooFewColumns { row_index: 0, got: 1, .. }));
    }

    #[test]
    fn inconsistent_row_length() {
        let err = load("1.0,2.0,0\n1.0,1\n", LabelColumn::Last).unwrap_err();
        match err {
            IoError::InconsistentRowLength {
                row_index,
                expected,
                got,
                ..
            } => {
                assert_eq!(row_index, 1);
                assert_eq!(expected, 3);
                assert_eq!(got, 2);
            }
            other => panic!("expected InconsistentRowLength, got {other:?}"),
        }
    }

    #[test]
    fn nan_value() {
        let err = load("1.0,NaN,0\n", LabelColumn::Last).unwrap_err();
        assert!(matches!(
            err,
            IoError::NonFiniteValue {
                row_index: 0,
                col_index: 1,
                ..
            }
        ));
    }

    #[test]
    fn unparseable_value() {
        let err = load("1.0,abc,0\n", LabelColumn::Last).unwrap_err();
        match err {
            IoError::NonFiniteValue { raw, .. } => assert_eq!(raw, "abc"),
            other => panic!("expected NonFiniteValue, got {other:?}"),
        }
    }

    #[test]
    fn fractional_label_rejected() {
        let err = load("1.0,2.0,0.5\n", LabelColumn::Last).unwrap_err();
        assert!(matches!(err, IoError::InvalidLabel { row_index: 0, .. }));
    }

    #[test]
    fn negative_label_rejected() {
        let err = load("-1,2.0\n", LabelColumn::First).unwrap_err();
        assert!(matches!(err, IoError::InvalidLabel { .. }));
    }
}
