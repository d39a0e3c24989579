//! Gini impurity and Gini gain over binary label distributions.

/// Constant added to every non-empty impurity so a pure node never scores exactly zero.
pub const GINI_OFFSET: f64 = 1e-8;

/// Count the labels equal to 0 and to 1.
///
/// Labels outside `{0, 1}` are counted in neither slot.
#[must_use]
pub(crate) fn class_counts<'a>(labels: impl IntoIterator<Item = &'a usize>) -> [usize; 2] {
    let mut counts = [0usize; 2];
    for &label in labels {
        if label < 2 {
            counts[label] += 1;
        }
    }
    counts
}

/// Gini impurity from class counts over `n_samples` labels.
///
/// Returns `0.0` when `n_samples` is zero.
#[must_use]
pub(crate) fn gini_from_counts(counts: [usize; 2], n_samples: usize) -> f64 {
    if n_samples == 0 {
        return 0.0;
    }
    let n = n_samples as f64;
    let p0 = counts[0] as f64 / n;
    let p1 = counts[1] as f64 / n;
    1.0 - p0 * p0 - p1 * p1 + GINI_OFFSET
}

/// Gini gain of a partition given as `(counts, size)` pairs.
///
/// Children are subtracted in order, each weighted by `size / parent_size`,
/// which keeps the result bit-identical to [`gini_gain`] on the same labels.
#[must_use]
pub(crate) fn gain_from_counts(parent: ([usize; 2], usize), children: &[([usize; 2], usize)]) -> f64 {
    let (parent_counts, n_parent) = parent;
    if n_parent == 0 {
        return 0.0;
    }
    let mut gain = gini_from_counts(parent_counts, n_parent);
    for &(counts, n_child) in children {
        gain -= gini_from_counts(counts, n_child) * n_child as f64 / n_parent as f64;
    }
    gain
}

/// Compute the Gini impurity of a binary label vector.
///
/// `1 - p0² - p1² + GINI_OFFSET`, where `p0` and `p1` are the fractions of
/// labels equal to 0 and 1. An empty vector has impurity `0.0`.
///
/// ```
/// use sapling_forest::gini_impurity;
///
/// assert_eq!(gini_impurity(&[]), 0.0);
/// assert!((gini_impurity(&[0, 1, 0, 1]) - 0.5).abs() < 1e-6);
/// ```
#[must_use]
pub fn gini_impurity(labels: &[usize]) -> f64 {
    gini_from_counts(class_counts(labels), labels.len())
}

/// Compute the Gini gain of splitting `parent` into `children`.
///
/// Parent impurity minus the size-weighted impurity of each child, weights
/// being `child.len() / parent.len()`. Higher is better. Returns `0.0` for an
/// empty parent.
#[must_use]
pub fn gini_gain(parent: &[usize], children: &[&[usize]]) -> f64 {
    let child_counts: Vec<([usize; 2], usize)> = children
        .iter()
        .map(|child| (class_counts(*child), child.len()))
        .collect();
    gain_from_counts((class_counts(parent), parent.len()), &child_counts)
}
