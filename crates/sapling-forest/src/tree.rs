use tracing::{debug, instrument};

use crate::{
    ForestError,
    node::{Decision, Node, NodeIndex},
    split::find_best_split,
    validate,
};

/// Configuration for a single decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter     | Default             |
/// |---------------|---------------------|
/// | `depth_limit` | `None` (unlimited)  |
#[derive(Debug, Clone, Default)]
pub struct DecisionTreeConfig {
    pub(crate) depth_limit: Option<usize>,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self { depth_limit: None }
    }

    /// Set the depth limit.
    ///
    /// `None` grows until leaves are pure or no split has positive gain.
    /// `Some(d)` turns every node at depth `d` into a majority leaf (the root
    /// is depth 0, so `Some(0)` yields a single leaf).
    #[must_use]
    pub fn with_depth_limit(mut self, depth_limit: Option<usize>) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Return the depth limit, if any.
    #[must_use]
    pub fn depth_limit(&self) -> Option<usize> {
        self.depth_limit
    }

    /// Train a decision tree on the provided row-major dataset.
    ///
    /// `features[sample_idx][feature_idx]`, `labels[sample_idx]` in `{0, 1}`.
    ///
    /// # Errors
    ///
    /// | Variant                                | When                                |
    /// |----------------------------------------|-------------------------------------|
    /// | [`ForestError::EmptyDataset`]          | `features` is empty                 |
    /// | [`ForestError::ZeroFeatures`]          | rows have zero feature columns      |
    /// | [`ForestError::FeatureCountMismatch`]  | rows have inconsistent lengths      |
    /// | [`ForestError::NonFiniteValue`]        | any value is NaN or infinite        |
    /// | [`ForestError::LabelCountMismatch`]    | `labels.len() != features.len()`    |
    /// | [`ForestError::NonBinaryLabel`]        | a label is not 0 or 1               |
    #[instrument(skip(self, features, labels), fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, ForestError> {
        let n_features = validate::training_set(features, labels)?;
        let n_samples = features.len();

        debug!(
            n_samples,
            n_features,
            depth_limit = ?self.depth_limit,
            "fitting decision tree"
        );

        // Convert to column-major layout for find_best_split.
        let col_features: Vec<Vec<f64>> = (0..n_features)
            .map(|feat_idx| features.iter().map(|row| row[feat_idx]).collect())
            .collect();

        let sample_indices: Vec<usize> = (0..n_samples).collect();
        let mut arena: Vec<Node> = Vec::new();
        let root = build_tree(&col_features, labels, &sample_indices, self, 0, &mut arena);

        debug!(
            root_index = root.index(),
            n_nodes = arena.len(),
            "decision tree built"
        );

        Ok(DecisionTree {
            nodes: arena,
            n_features,
            depth_limit: self.depth_limit,
        })
    }
}

/// Recursively build the arena-based decision tree.
///
/// Returns the [`NodeIndex`] of the node just created in `arena`.
fn build_tree(
    col_features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    config: &DecisionTreeConfig,
    depth: usize,
    arena: &mut Vec<Node>,
) -> NodeIndex {
    let n_samples = sample_indices.len();
    // Partitions are never empty below the root and the root is validated.
    let first_label = sample_indices.first().map_or(0, |&si| labels[si]);

    let push_leaf = |arena: &mut Vec<Node>, label: usize| -> NodeIndex {
        arena.push(Node::Leaf { label, n_samples });
        NodeIndex::new(arena.len() - 1)
    };

    if n_samples <= 1 {
        return push_leaf(arena, first_label);
    }

    if sample_indices.iter().all(|&si| labels[si] == first_label) {
        return push_leaf(arena, first_label);
    }

    if config.depth_limit.is_some_and(|limit| depth >= limit) {
        let ones = sample_indices.iter().filter(|&&si| labels[si] == 1).count();
        let majority = usize::from(ones > n_samples - ones);
        return push_leaf(arena, majority);
    }

    // No feature with positive gain: fall back to the first example's label.
    let Some(split) = find_best_split(col_features, labels, sample_indices) else {
        return push_leaf(arena, first_label);
    };

    // Arena pattern: reserve index, recurse, then overwrite with the split.
    let node_idx = arena.len();
    arena.push(Node::Leaf {
        label: first_label,
        n_samples,
    });

    let left = build_tree(
        col_features,
        labels,
        &split.left_indices,
        config,
        depth + 1,
        arena,
    );
    let right = build_tree(
        col_features,
        labels,
        &split.right_indices,
        config,
        depth + 1,
        arena,
    );

    arena[node_idx] = Node::Split {
        rule: split.rule,
        left,
        right,
        n_samples,
        gain: split.gain,
    };

    NodeIndex::new(node_idx)
}

/// A fitted binary decision tree.
///
/// Stored as an arena-based `Vec<Node>` rooted at index 0. Deserialization
/// goes through [`DecisionTree::from_nodes`], so a malformed arena is rejected.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "TreeParts")]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) depth_limit: Option<usize>,
}

#[derive(serde::Deserialize)]
struct TreeParts {
    nodes: Vec<Node>,
    n_features: usize,
    depth_limit: Option<usize>,
}

impl TryFrom<TreeParts> for DecisionTree {
    type Error = ForestError;

    fn try_from(parts: TreeParts) -> Result<Self, Self::Error> {
        let mut tree = Self::from_nodes(parts.nodes, parts.n_features)?;
        tree.depth_limit = parts.depth_limit;
        Ok(tree)
    }
}

impl DecisionTree {
    /// Assemble a tree from hand-built nodes.
    ///
    /// `nodes[0]` is the root. Every child index must point strictly after
    /// its parent, every node must be reachable exactly once, split features
    /// must be below `n_features`, and leaf labels must be 0 or 1.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MalformedTree`] naming the first offending node,
    /// or [`ForestError::ZeroFeatures`] when `n_features` is zero.
    pub fn from_nodes(nodes: Vec<Node>, n_features: usize) -> Result<Self, ForestError> {
        if n_features == 0 {
            return Err(ForestError::ZeroFeatures);
        }
        if nodes.is_empty() {
            return Err(ForestError::MalformedTree {
                node: 0,
                reason: "tree has no nodes".to_string(),
            });
        }

        let mut parents = vec![0usize; nodes.len()];
        for (idx, node) in nodes.iter().enumerate() {
            match node {
                Node::Leaf { label, .. } => {
                    if *label > 1 {
                        return Err(ForestError::MalformedTree {
                            node: idx,
                            reason: format!("leaf label {label} is not binary"),
                        });
                    }
                }
                Node::Split {
                    rule, left, right, ..
                } => {
                    if rule.feature.index() >= n_features {
                        return Err(ForestError::MalformedTree {
                            node: idx,
                            reason: format!(
                                "feature {} out of range for {n_features} features",
                                rule.feature
                            ),
                        });
                    }
                    for child in [left.index(), right.index()] {
                        if child <= idx || child >= nodes.len() {
                            return Err(ForestError::MalformedTree {
                                node: idx,
                                reason: format!("child {child} must lie in ({idx}, {})", nodes.len()),
                            });
                        }
                        parents[child] += 1;
                    }
                }
            }
        }

        if let Some(idx) = (1..nodes.len()).find(|&i| parents[i] != 1) {
            return Err(ForestError::MalformedTree {
                node: idx,
                reason: format!("node has {} parents, expected 1", parents[idx]),
            });
        }

        Ok(Self {
            nodes,
            n_features,
            depth_limit: None,
        })
    }

    /// Classify a single sample by walking from the root to a leaf.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn decide(&self, sample: &[f64]) -> Result<usize, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(self.walk(sample))
    }

    /// Classify every row, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] if any row has the wrong width.
    pub fn classify(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, ForestError> {
        validate::prediction_rows(features, self.n_features)?;
        Ok(features.iter().map(|row| self.walk(row)).collect())
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the number of features this tree expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the depth limit the tree was grown with.
    #[must_use]
    pub fn depth_limit(&self) -> Option<usize> {
        self.depth_limit
    }

    /// Borrow the node arena; index 0 is the root.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        // Children follow parents in the arena, so one forward pass suffices.
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max_depth = 0;
        for (idx, node) in self.nodes.iter().enumerate() {
            max_depth = max_depth.max(depths[idx]);
            if let Node::Split { left, right, .. } = node {
                depths[left.index()] = depths[idx] + 1;
                depths[right.index()] = depths[idx] + 1;
            }
        }
        max_depth
    }

    fn walk(&self, sample: &[f64]) -> usize {
        let mut idx = NodeIndex::new(0);
        loop {
            match self.nodes[idx.index()].decide(sample) {
                Decision::Label(label) => return label,
                Decision::Descend(next) => idx = next,
            }
        }
    }
}
