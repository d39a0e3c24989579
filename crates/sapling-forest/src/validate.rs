//! Up-front checks shared by tree and forest training and by the metrics.

use crate::error::ForestError;

/// Check a row-major sample matrix and its label vector.
///
/// Returns the number of feature columns on success.
pub(crate) fn training_set(features: &[Vec<f64>], labels: &[usize]) -> Result<usize, ForestError> {
    if features.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(ForestError::ZeroFeatures);
    }

    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(ForestError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(ForestError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }

    if labels.len() != features.len() {
        return Err(ForestError::LabelCountMismatch {
            expected: features.len(),
            got: labels.len(),
        });
    }
    binary_labels(labels)?;

    Ok(n_features)
}

/// Reject any label outside `{0, 1}`.
pub(crate) fn binary_labels(labels: &[usize]) -> Result<(), ForestError> {
    match labels.iter().enumerate().find(|&(_, &l)| l > 1) {
        Some((index, &label)) => Err(ForestError::NonBinaryLabel { index, label }),
        None => Ok(()),
    }
}

/// Check that every prediction row has the trained width.
pub(crate) fn prediction_rows(features: &[Vec<f64>], expected: usize) -> Result<(), ForestError> {
    match features.iter().find(|row| row.len() != expected) {
        Some(row) => Err(ForestError::PredictionFeatureMismatch {
            expected,
            got: row.len(),
        }),
        None => Ok(()),
    }
}
