//! Binary confusion matrix and the accuracy, precision and recall derived from it.
//!
//! Class 1 is the positive class. Every metric reports a zero denominator as
//! [`ForestError::UndefinedMetric`] instead of returning NaN.

use std::fmt;

use crate::error::ForestError;
use crate::validate;

/// Counts of a binary classifier's outcomes against the true labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ConfusionMatrix {
    true_positives: usize,
    false_negatives: usize,
    false_positives: usize,
    true_negatives: usize,
}

impl ConfusionMatrix {
    /// Tally `predicted` against `actual`.
    ///
    /// # Errors
    ///
    /// | Variant                             | When                                   |
    /// |-------------------------------------|----------------------------------------|
    /// | [`ForestError::LabelCountMismatch`] | `predicted.len() != actual.len()`      |
    /// | [`ForestError::NonBinaryLabel`]     | either side holds a label above 1      |
    pub fn from_labels(predicted: &[usize], actual: &[usize]) -> Result<Self, ForestError> {
        if predicted.len() != actual.len() {
            return Err(ForestError::LabelCountMismatch {
                expected: actual.len(),
                got: predicted.len(),
            });
        }
        validate::binary_labels(predicted)?;
        validate::binary_labels(actual)?;

        let mut cm = Self {
            true_positives: 0,
            false_negatives: 0,
            false_positives: 0,
            true_negatives: 0,
        };
        for (&p, &a) in predicted.iter().zip(actual) {
            match (p, a) {
                (1, 1) => cm.true_positives += 1,
                (0, 1) => cm.false_negatives += 1,
                (1, 0) => cm.false_positives += 1,
                _ => cm.true_negatives += 1,
            }
        }
        Ok(cm)
    }

    /// Return the matrix as `[[TP, FN], [FP, TN]]`.
    #[must_use]
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        [
            [self.true_positives, self.false_negatives],
            [self.false_positives, self.true_negatives],
        ]
    }

    /// Return the count of class-1 labels predicted as 1.
    #[must_use]
    pub fn true_positives(&self) -> usize {
        self.true_positives
    }

    /// Return the count of class-1 labels predicted as 0.
    #[must_use]
    pub fn false_negatives(&self) -> usize {
        self.false_negatives
    }

    /// Return the count of class-0 labels predicted as 1.
    #[must_use]
    pub fn false_positives(&self) -> usize {
        self.false_positives
    }

    /// Return the count of class-0 labels predicted as 0.
    #[must_use]
    pub fn true_negatives(&self) -> usize {
        self.true_negatives
    }

    /// Return the number of labelled pairs tallied.
    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positives + self.false_negatives + self.false_positives + self.true_negatives
    }

    /// `TP / (TP + FP)`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::UndefinedMetric`] when nothing was predicted positive.
    pub fn precision(&self) -> Result<f64, ForestError> {
        ratio(
            "precision",
            "no positive predictions",
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    /// `TP / (TP + FN)`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::UndefinedMetric`] when no actual label is positive.
    pub fn recall(&self) -> Result<f64, ForestError> {
        ratio(
            "recall",
            "no positive labels",
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    /// Fraction of pairs where prediction and label agree.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::UndefinedMetric`] when the matrix is empty.
    pub fn accuracy(&self) -> Result<f64, ForestError> {
        ratio(
            "accuracy",
            "no labels",
            self.true_positives + self.true_negatives,
            self.total(),
        )
    }
}

fn ratio(
    metric: &'static str,
    reason: &'static str,
    numerator: usize,
    denominator: usize,
) -> Result<f64, ForestError> {
    if denominator == 0 {
        return Err(ForestError::UndefinedMetric { metric, reason });
    }
    Ok(numerator as f64 / denominator as f64)
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10} {:>7} {:>7}", "", "pred_1", "pred_0")?;
        writeln!(
            f,
            "{:>10} {:>7} {:>7}",
            "actual_1", self.true_positives, self.false_negatives
        )?;
        writeln!(
            f,
            "{:>10} {:>7} {:>7}",
            "actual_0", self.false_positives, self.true_negatives
        )
    }
}

/// Build the confusion matrix of `predicted` against `actual`.
///
/// # Errors
///
/// See [`ConfusionMatrix::from_labels`].
pub fn confusion_matrix(predicted: &[usize], actual: &[usize]) -> Result<ConfusionMatrix, ForestError> {
    ConfusionMatrix::from_labels(predicted, actual)
}

/// Precision of `predicted` against `actual`, with class 1 as positive.
///
/// ```
/// use sapling_forest::precision;
///
/// assert_eq!(precision(&[1, 1, 0, 0], &[1, 0, 0, 1]).unwrap(), 0.5);
/// assert!(precision(&[0, 0], &[1, 0]).is_err());
/// ```
///
/// # Errors
///
/// Length and label errors from [`confusion_matrix`], or
/// [`ForestError::UndefinedMetric`] when nothing was predicted positive.
pub fn precision(predicted: &[usize], actual: &[usize]) -> Result<f64, ForestError> {
    confusion_matrix(predicted, actual)?.precision()
}

/// Recall of `predicted` against `actual`, with class 1 as positive.
///
/// # Errors
///
/// Length and label errors from [`confusion_matrix`], or
/// [`ForestError::UndefinedMetric`] when no actual label is positive.
pub fn recall(predicted: &[usize], actual: &[usize]) -> Result<f64, ForestError> {
    confusion_matrix(predicted, actual)?.recall()
}

/// Fraction of positions where `predicted` equals `actual`.
///
/// # Errors
///
/// Length and label errors from [`confusion_matrix`], or
/// [`ForestError::UndefinedMetric`] when both are empty.
pub fn accuracy(predicted: &[usize], actual: &[usize]) -> Result<f64, ForestError> {
    confusion_matrix(predicted, actual)?.accuracy()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_confusion_matrix() {
        let cm = confusion_matrix(&[1, 1, 0, 0], &[1, 0, 0, 1]).unwrap();
        assert_eq!(cm.as_rows(), [[1, 1], [1, 1]]);
        assert_eq!(cm.total(), 4);
        assert!((cm.precision().unwrap() - 0.5).abs() < f64::EPSILON);
        assert!((cm.recall().unwrap() - 0.5).abs() < f64::EPSILON);
        assert!((cm.accuracy().unwrap() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn asymmetric_counts() {
        // TP=2, FN=1, FP=0, TN=1
        let predicted = [1, 1, 0, 0];
        let actual = [1, 1, 1, 0];
        let cm = confusion_matrix(&predicted, &actual).unwrap();
        assert_eq!(cm.as_rows(), [[2, 1], [0, 1]]);
        assert_eq!(
            (cm.true_positives(), cm.false_negatives(), cm.false_positives(), cm.true_negatives()),
            (2, 1, 0, 1)
        );
        assert!((precision(&predicted, &actual).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!((recall(&predicted, &actual).unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((accuracy(&predicted, &actual).unwrap() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn self_accuracy_is_one() {
        let labels = [0, 1, 1, 0, 1];
        assert!((accuracy(&labels, &labels).unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn precision_undefined_without_positive_predictions() {
        let err = precision(&[0, 0, 0], &[1, 0, 1]).unwrap_err();
        assert!(matches!(
            err,
            ForestError::UndefinedMetric {
                metric: "precision",
                ..
            }
        ));
    }

    #[test]
    fn recall_undefined_without_positive_labels() {
        let err = recall(&[1, 0], &[0, 0]).unwrap_err();
        assert!(matches!(err, ForestError::UndefinedMetric { metric: "recall", .. }));
    }

    #[test]
    fn empty_inputs_are_undefined() {
        assert!(matches!(
            accuracy(&[], &[]).unwrap_err(),
            ForestError::UndefinedMetric { metric: "accuracy", .. }
        ));
        assert!(precision(&[], &[]).is_err());
        assert!(recall(&[], &[]).is_err());
        assert_eq!(confusion_matrix(&[], &[]).unwrap().total(), 0);
    }

    #[test]
    fn length_mismatch_error() {
        let err = confusion_matrix(&[1, 0, 1], &[1, 0]).unwrap_err();
        assert!(matches!(
            err,
            ForestError::LabelCountMismatch { expected: 2, got: 3 }
        ));
    }

    #[test]
    fn non_binary_label_error() {
        let err = accuracy(&[0, 1], &[2, 1]).unwrap_err();
        assert!(matches!(err, ForestError::NonBinaryLabel { index: 0, label: 2 }));
    }

    #[test]
    fn display_formatting() {
        let cm = confusion_matrix(&[1, 0], &[1, 0]).unwrap();
        let output = cm.to_string();
        assert!(output.contains("pred_1"));
        assert!(output.contains("actual_0"));
    }

    #[test]
    fn serializes_counts() {
        let cm = confusion_matrix(&[1, 0, 1], &[1, 1, 0]).unwrap();
        let json = serde_json::to_value(cm).unwrap();
        assert_eq!(json["true_positives"], 1);
        assert_eq!(json["false_negatives"], 1);
        assert_eq!(json["false_positives"], 1);
        assert_eq!(json["true_negatives"], 0);
    }
}
