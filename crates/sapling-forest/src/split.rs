use crate::impurity::gain_from_counts;
use crate::node::SplitRule;

/// Number of equal steps each feature's observed range is cut into.
pub(crate) const THRESHOLD_STEPS: usize = 400;

/// Result of finding the best split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Winning feature and threshold.
    pub(crate) rule: SplitRule,
    /// Gini gain of the partition.
    pub(crate) gain: f64,
    /// Sample indices with `value <= threshold`.
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices with `value > threshold`.
    pub(crate) right_indices: Vec<usize>,
}

/// Candidate thresholds for one feature column over `sample_indices`.
///
/// `min + k * step` for `k = 1, 2, ...` while strictly below `max`, with
/// `step = (max - min) / THRESHOLD_STEPS`. Empty when the column is constant.
pub(crate) fn candidate_thresholds(
    column: &[f64],
    sample_indices: &[usize],
) -> impl Iterator<Item = f64> + use<> {
    let (min, max) = sample_indices
        .iter()
        .map(|&si| column[si])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let step = (max - min) / THRESHOLD_STEPS as f64;
    (1..=THRESHOLD_STEPS)
        .map(move |k| min + k as f64 * step)
        .take_while(move |&t| t < max)
}

/// Find the highest-gain split among all features.
///
/// Within a feature the first threshold reaching the best gain wins; across
/// features the first feature wins ties, and a feature is only taken when its
/// best gain is strictly above `0.0`. Returns `None` when no feature clears
/// that bar, including when every column is constant.
///
/// # Column-major layout
///
/// `features` is column-major: `features[feature_idx][sample_idx]`.
/// `sample_indices` are indices into these inner Vecs.
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
) -> Option<SplitResult> {
    let n_samples = sample_indices.len();
    if n_samples == 0 {
        return None;
    }

    let mut parent_counts = [0usize; 2];
    for &si in sample_indices {
        parent_counts[labels[si]] += 1;
    }

    let mut best_gain = 0.0;
    let mut best: Option<SplitRule> = None;

    for (feat_idx, column) in features.iter().enumerate() {
        let mut feature_gain = f64::NEG_INFINITY;
        let mut feature_threshold = f64::NAN;

        for threshold in candidate_thresholds(column, sample_indices) {
            let mut left_counts = [0usize; 2];
            for &si in sample_indices {
                if column[si] <= threshold {
                    left_counts[labels[si]] += 1;
                }
            }
            let n_left = left_counts[0] + left_counts[1];
            let right_counts = [
                parent_counts[0] - left_counts[0],
                parent_counts[1] - left_counts[1],
            ];

            let gain = gain_from_counts(
                (parent_counts, n_samples),
                &[(left_counts, n_left), (right_counts, n_samples - n_left)],
            );
            if gain > feature_gain {
                feature_gain = gain;
                feature_threshold = threshold;
            }
        }

        if feature_gain > best_gain {
            best_gain = feature_gain;
            best = Some(SplitRule::new(feat_idx, feature_threshold));
        }
    }

    let rule = best?;

    let column = &features[rule.feature.index()];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| column[si] <= rule.threshold);

    Some(SplitResult {
        rule,
        gain: best_gain,
        left_indices,
        right_indices,
    })
}
