//! Binary classification with Gini-driven decision trees and random forests.
//!
//! Trees are grown greedily on axis-aligned `value <= threshold` splits
//! chosen from a fixed grid over each feature's observed range. A forest
//! trains its trees in parallel via rayon, each on a bootstrap sample of the
//! rows and a random subset of the columns, and classifies by majority vote.
//! Accuracy, precision and recall are computed from a binary confusion matrix.

mod config;
mod error;
mod forest;
mod impurity;
mod metrics;
mod node;
mod split;
mod tree;
mod validate;

pub use config::RandomForestConfig;
pub use error::ForestError;
pub use forest::{ForestMember, MAX_EXAMPLE_SUBSAMPLE_RATE, RandomForest};
pub use impurity::{GINI_OFFSET, gini_gain, gini_impurity};
pub use metrics::{ConfusionMatrix, accuracy, confusion_matrix, precision, recall};
pub use node::{Decision, FeatureIndex, Node, NodeIndex, SplitRule};
pub use tree::{DecisionTree, DecisionTreeConfig};
