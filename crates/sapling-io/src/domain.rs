//! Domain types for sapling-io.

use std::fmt;
use std::str::FromStr;

use crate::IoError;

/// Which CSV column holds the class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelColumn {
    /// The first column is the label; the rest are features.
    First,
    /// The last column is the label; the rest are features.
    #[default]
    Last,
}

impl LabelColumn {
    /// Return the label's column index in a row of `n_columns` cells.
    #[must_use]
    pub fn index(self, n_columns: usize) -> usize {
        match self {
            LabelColumn::First => 0,
            LabelColumn::Last => n_columns.saturating_sub(1),
        }
    }
}

impl FromStr for LabelColumn {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(LabelColumn::First),
            "last" => Ok(LabelColumn::Last),
            other => Err(IoError::InvalidLabelColumn {
                tag: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LabelColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelColumn::First => f.write_str("first"),
            LabelColumn::Last => f.write_str("last"),
        }
    }
}

/// A sample matrix with one class label per row.
///
/// Produced by [`CsvLoader`](crate::CsvLoader). `labels[i]` belongs to
/// `features[i]`, and every row has the same width.
#[derive(Debug, Clone)]
pub struct LabelledData {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
}

impl LabelledData {
    pub(crate) fn new(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Self {
        debug_assert_eq!(features.len(), labels.len());
        Self { features, labels }
    }

    /// Feature rows: `features()[sample_index][feature_index]`.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Class labels, one per feature row.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Return the number of samples (rows).
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of feature columns (the label column excluded).
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    /// Consume into `(features, labels)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Vec<f64>>, Vec<usize>) {
        (self.features, self.labels)
    }
}
