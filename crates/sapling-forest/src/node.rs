use std::fmt;

/// Zero-based feature column index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    /// Create a new feature index from a zero-based column position.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis-aligned decision rule: `sample[feature] <= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SplitRule {
    /// Feature tested by the rule.
    pub feature: FeatureIndex,
    /// Samples with a value at or below this go left.
    pub threshold: f64,
}

impl SplitRule {
    /// Create a rule testing column `feature` against `threshold`.
    #[must_use]
    pub fn new(feature: usize, threshold: f64) -> Self {
        Self {
            feature: FeatureIndex::new(feature),
            threshold,
        }
    }

    /// Return `true` when the sample belongs to the left branch.
    ///
    /// # Panics
    ///
    /// Panics if `sample` is shorter than `feature + 1`; trees check sample
    /// width before walking.
    #[must_use]
    pub fn evaluate(&self, sample: &[f64]) -> bool {
        sample[self.feature.index()] <= self.threshold
    }
}

impl fmt::Display for SplitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x[{}] <= {}", self.feature, self.threshold)
    }
}

/// Outcome of asking a single node about a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The node is a leaf carrying this label.
    Label(usize),
    /// Continue at this child.
    Descend(NodeIndex),
}

/// A node in a decision tree arena.
///
/// Trees are stored as `Vec<Node>` where children are referenced by
/// [`NodeIndex`] rather than pointers. The root is index 0 and each child
/// sits after its parent.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// An interior decision node.
    Split {
        /// Rule routing samples: true goes left.
        rule: SplitRule,
        /// Index of the left child node.
        left: NodeIndex,
        /// Index of the right child node.
        right: NodeIndex,
        /// Number of training samples that reached this node.
        n_samples: usize,
        /// Gini gain of the chosen split.
        gain: f64,
    },
    /// A terminal leaf node.
    Leaf {
        /// Class label returned for samples reaching this leaf.
        label: usize,
        /// Number of training samples in this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Build a leaf for a hand-assembled tree.
    #[must_use]
    pub fn leaf(label: usize) -> Self {
        Node::Leaf {
            label,
            n_samples: 0,
        }
    }

    /// Build a decision node for a hand-assembled tree.
    #[must_use]
    pub fn split(rule: SplitRule, left: NodeIndex, right: NodeIndex) -> Self {
        Node::Split {
            rule,
            left,
            right,
            n_samples: 0,
            gain: 0.0,
        }
    }

    /// Take one step for `sample`: a leaf answers, a split names the next node.
    #[must_use]
    pub fn decide(&self, sample: &[f64]) -> Decision {
        match self {
            Node::Leaf { label, .. } => Decision::Label(*label),
            Node::Split {
                rule, left, right, ..
            } => {
                if rule.evaluate(sample) {
                    Decision::Descend(*left)
                } else {
                    Decision::Descend(*right)
                }
            }
        }
    }

    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{Decision, FeatureIndex, Node, NodeIndex, SplitRule};

    #[test]
    fn feature_index_display() {
        assert_eq!(format!("{}", FeatureIndex::new(3)), "3");
    }

    #[test]
    fn node_index_ordering() {
        assert!(NodeIndex::new(10) < NodeIndex::new(20));
    }

    #[test]
    fn rule_is_inclusive_at_threshold() {
        let rule = SplitRule::new(1, 2.5);
        assert!(rule.evaluate(&[9.0, 2.5]));
        assert!(rule.evaluate(&[9.0, -1.0]));
        assert!(!rule.evaluate(&[0.0, 2.500001]));
    }

    #[test]
    fn rule_display() {
        assert_eq!(SplitRule::new(2, 0.5).to_string(), "x[2] <= 0.5");
    }

    #[test]
    fn leaf_decides_label() {
        let leaf = Node::leaf(1);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.decide(&[0.0]), Decision::Label(1));
    }

    #[test]
    fn split_routes_true_left() {
        let node = Node::split(SplitRule::new(0, 0.5), NodeIndex::new(1), NodeIndex::new(2));
        assert!(!node.is_leaf());
        assert_eq!(node.decide(&[0.0]), Decision::Descend(NodeIndex::new(1)));
        assert_eq!(node.decide(&[1.0]), Decision::Descend(NodeIndex::new(2)));
    }

    #[test]
    fn hand_built_nodes_have_no_samples() {
        assert_eq!(Node::leaf(0).n_samples(), 0);
    }
}
