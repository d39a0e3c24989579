//! Configuration builder for random forest training.

use crate::error::ForestError;
use crate::forest::RandomForest;

/// Configuration for random forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter                | Default |
/// |--------------------------|---------|
/// | `depth_limit`            | `None`  |
/// | `example_subsample_rate` | 1.0     |
/// | `attr_subsample_rate`    | 1.0     |
/// | `seed`                   | 42      |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) num_trees: usize,
    pub(crate) depth_limit: Option<usize>,
    pub(crate) example_subsample_rate: f64,
    pub(crate) attr_subsample_rate: f64,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `num_trees` is zero.
    pub fn new(num_trees: usize) -> Result<Self, ForestError> {
        if num_trees == 0 {
            return Err(ForestError::InvalidTreeCount { num_trees });
        }
        Ok(Self {
            num_trees,
            depth_limit: None,
            example_subsample_rate: 1.0,
            attr_subsample_rate: 1.0,
            seed: 42,
        })
    }

    // --- Setters ---

    /// Set the depth limit shared by every tree. `None` means unlimited.
    #[must_use]
    pub fn with_depth_limit(mut self, depth_limit: Option<usize>) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Set the bootstrap size as a multiple of the training row count.
    ///
    /// Rows are drawn with replacement, so rates above 1.0 are allowed up to
    /// [`MAX_EXAMPLE_SUBSAMPLE_RATE`](crate::MAX_EXAMPLE_SUBSAMPLE_RATE).
    #[must_use]
    pub fn with_example_subsample_rate(mut self, rate: f64) -> Self {
        self.example_subsample_rate = rate;
        self
    }

    /// Set the fraction of feature columns each tree sees, in (0.0, 1.0].
    #[must_use]
    pub fn with_attr_subsample_rate(mut self, rate: f64) -> Self {
        self.attr_subsample_rate = rate;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn num_trees(&self) -> usize {
        self.num_trees
    }

    /// Return the depth limit, if any.
    #[must_use]
    pub fn depth_limit(&self) -> Option<usize> {
        self.depth_limit
    }

    /// Return the example (row) subsample rate.
    #[must_use]
    pub fn example_subsample_rate(&self) -> f64 {
        self.example_subsample_rate
    }

    /// Return the attribute (column) subsample rate.
    #[must_use]
    pub fn attr_subsample_rate(&self) -> f64 {
        self.attr_subsample_rate
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a random forest on the provided dataset.
    ///
    /// `features[sample_idx][feature_idx]` (row-major), `labels[sample_idx]` in `{0, 1}`.
    ///
    /// # Errors
    ///
    /// | Variant                                 | When                                          |
    /// |-----------------------------------------|-----------------------------------------------|
    /// | [`ForestError::EmptyDataset`]           | `features` is empty                           |
    /// | [`ForestError::ZeroFeatures`]           | rows have zero feature columns                |
    /// | [`ForestError::FeatureCountMismatch`]   | rows have inconsistent lengths                |
    /// | [`ForestError::NonFiniteValue`]         | any value is NaN or infinite                  |
    /// | [`ForestError::LabelCountMismatch`]     | `labels.len() != features.len()`              |
    /// | [`ForestError::NonBinaryLabel`]         | a label is not 0 or 1                         |
    /// | [`ForestError::InvalidSubsampleRate`]   | a rate is non-finite or out of range          |
    /// | [`ForestError::EmptySubsample`]         | a rate rounds to zero rows or columns         |
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<RandomForest, ForestError> {
        crate::forest::train(self, features, labels)
    }
}
