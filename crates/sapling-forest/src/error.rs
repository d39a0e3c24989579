/// Errors from tree induction, forest training, classification and metrics.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when num_trees is zero.
    #[error("num_trees must be at least 1, got {num_trees}")]
    InvalidTreeCount {
        /// The invalid num_trees value provided.
        num_trees: usize,
    },

    /// Returned when a subsample rate is NaN, infinite, or outside its allowed range.
    #[error("{name} must be in {allowed}, got {rate}")]
    InvalidSubsampleRate {
        /// Which rate was rejected.
        name: &'static str,
        /// Human-readable allowed range.
        allowed: &'static str,
        /// The rejected value.
        rate: f64,
    },

    /// Returned when a subsample rate rounds to zero rows or zero columns.
    #[error("{name} of {rate} selects 0 of {available} {axis}")]
    EmptySubsample {
        /// Which rate produced the empty draw.
        name: &'static str,
        /// The configured rate.
        rate: f64,
        /// Number of rows or columns available.
        available: usize,
        /// `"rows"` or `"columns"`.
        axis: &'static str,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when a sample has a different number of features at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when two label sequences (or features and labels) differ in length.
    #[error("expected {expected} labels, got {got}")]
    LabelCountMismatch {
        /// Length required by the other operand.
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },

    /// Returned when a label is neither 0 nor 1.
    #[error("label {label} at index {index} is not binary (expected 0 or 1)")]
    NonBinaryLabel {
        /// The zero-based position of the offending label.
        index: usize,
        /// The label value found.
        label: usize,
    },

    /// Returned when a metric's denominator is zero.
    #[error("{metric} is undefined: {reason}")]
    UndefinedMetric {
        /// Name of the metric.
        metric: &'static str,
        /// Why the denominator vanished.
        reason: &'static str,
    },

    /// Returned when a hand-assembled node arena is not a valid tree.
    #[error("malformed tree at node {node}: {reason}")]
    MalformedTree {
        /// Arena index of the offending node.
        node: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Returned when a deserialized forest is inconsistent with its members.
    #[error("malformed forest at member {member}: {reason}")]
    MalformedForest {
        /// Index of the offending member.
        member: usize,
        /// What is wrong with it.
        reason: String,
    },
}
