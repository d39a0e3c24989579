//! Random forest training with parallel tree construction, and majority-vote classification.

use rand::Rng;
use rand::SeedableRng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::ForestError;
use crate::node::FeatureIndex;
use crate::tree::{DecisionTree, DecisionTreeConfig};
use crate::validate;

/// One tree of the ensemble together with the columns it was trained on.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ForestMember {
    tree: DecisionTree,
    columns: Vec<FeatureIndex>,
}

impl ForestMember {
    /// Borrow the fitted tree.
    #[must_use]
    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    /// Return the ordered column subset; column `i` of the tree's input is
    /// column `columns[i]` of the full matrix.
    #[must_use]
    pub fn columns(&self) -> &[FeatureIndex] {
        &self.columns
    }

    fn project(&self, row: &[f64]) -> Vec<f64> {
        self.columns.iter().map(|c| row[c.index()]).collect()
    }

    fn classify(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, ForestError> {
        let projected: Vec<Vec<f64>> = features.iter().map(|row| self.project(row)).collect();
        self.tree.classify(&projected)
    }
}

/// Largest accepted example subsample rate, as a multiple of the row count.
pub const MAX_EXAMPLE_SUBSAMPLE_RATE: f64 = 10.0;

/// A fitted random forest ensemble.
///
/// Deserialization checks that the forest has members and that every member
/// column lies below `n_features` and matches its tree's width.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ForestParts")]
pub struct RandomForest {
    pub(crate) members: Vec<ForestMember>,
    pub(crate) n_features: usize,
}

#[derive(serde::Deserialize)]
struct ForestParts {
    members: Vec<ForestMember>,
    n_features: usize,
}

impl TryFrom<ForestParts> for RandomForest {
    type Error = ForestError;

    fn try_from(parts: ForestParts) -> Result<Self, Self::Error> {
        let malformed = |member: usize, reason: String| ForestError::MalformedForest { member, reason };
        if parts.members.is_empty() {
            return Err(malformed(0, "forest has no members".to_string()));
        }
        for (idx, member) in parts.members.iter().enumerate() {
            if member.columns.len() != member.tree.n_features() {
                return Err(malformed(
                    idx,
                    format!(
                        "{} columns for a tree of {} features",
                        member.columns.len(),
                        member.tree.n_features()
                    ),
                ));
            }
            if let Some(col) = member.columns.iter().find(|c| c.index() >= parts.n_features) {
                return Err(malformed(
                    idx,
                    format!("column {col} out of range for {} features", parts.n_features),
                ));
            }
        }
        Ok(Self {
            members: parts.members,
            n_features: parts.n_features,
        })
    }
}

/// Resolve a subsample rate to a concrete count of `available` items.
fn subsample_size(
    name: &'static str,
    rate: f64,
    available: usize,
    axis: &'static str,
) -> Result<usize, ForestError> {
    let size = (rate * available as f64).round() as usize;
    if size == 0 {
        return Err(ForestError::EmptySubsample {
            name,
            rate,
            available,
            axis,
        });
    }
    Ok(size)
}

/// Draw `draw_count` row indices uniformly with replacement.
fn bootstrap_rows(n_samples: usize, draw_count: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..draw_count).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Draw `n_columns` distinct column indices, keeping draw order.
fn sample_columns(n_features: usize, n_columns: usize, rng: &mut impl Rng) -> Vec<FeatureIndex> {
    index::sample(rng, n_features, n_columns)
        .into_iter()
        .map(FeatureIndex::new)
        .collect()
}

/// Train the random forest ensemble.
#[instrument(skip_all, fields(num_trees = config.num_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<RandomForest, ForestError> {
    let n_features = validate::training_set(features, labels)?;
    let n_samples = features.len();

    let example_rate = config.example_subsample_rate;
    if !example_rate.is_finite()
        || example_rate <= 0.0
        || example_rate > MAX_EXAMPLE_SUBSAMPLE_RATE
    {
        return Err(ForestError::InvalidSubsampleRate {
            name: "example_subsample_rate",
            allowed: "(0.0, 10.0]",
            rate: example_rate,
        });
    }
    let attr_rate = config.attr_subsample_rate;
    if !attr_rate.is_finite() || attr_rate <= 0.0 || attr_rate > 1.0 {
        return Err(ForestError::InvalidSubsampleRate {
            name: "attr_subsample_rate",
            allowed: "(0.0, 1.0]",
            rate: attr_rate,
        });
    }

    let n_rows = subsample_size("example_subsample_rate", example_rate, n_samples, "rows")?;
    let n_columns = subsample_size("attr_subsample_rate", attr_rate, n_features, "columns")?;

    info!(
        num_trees = config.num_trees,
        n_samples,
        n_features,
        n_rows,
        n_columns,
        "training random forest"
    );

    // Per-tree seeds come from one master stream so results do not depend on scheduling.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.num_trees).map(|_| master_rng.r#gen()).collect();

    let tree_config = DecisionTreeConfig::new().with_depth_limit(config.depth_limit);

    let members: Vec<ForestMember> = tree_seeds
        .into_par_iter()
        .map(|seed| -> Result<ForestMember, ForestError> {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let rows = bootstrap_rows(n_samples, n_rows, &mut rng);
            let columns = sample_columns(n_features, n_columns, &mut rng);

            let sub_features: Vec<Vec<f64>> = rows
                .iter()
                .map(|&r| columns.iter().map(|c| features[r][c.index()]).collect())
                .collect();
            let sub_labels: Vec<usize> = rows.iter().map(|&r| labels[r]).collect();

            let tree = tree_config.fit(&sub_features, &sub_labels)?;
            Ok(ForestMember { tree, columns })
        })
        .collect::<Result<_, _>>()?;

    debug!(
        n_trees_trained = members.len(),
        total_nodes = members.iter().map(|m| m.tree.n_nodes()).sum::<usize>(),
        "tree training complete"
    );

    Ok(RandomForest {
        members,
        n_features,
    })
}

impl RandomForest {
    /// Fraction of trees voting for class 1, per row.
    ///
    /// Each tree sees every row re-projected onto its own column subset.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] if any row has the wrong width.
    pub fn vote_share(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, ForestError> {
        validate::prediction_rows(features, self.n_features)?;

        // votes[tree][row]
        let votes: Vec<Vec<usize>> = self
            .members
            .par_iter()
            .map(|member| member.classify(features))
            .collect::<Result<_, ForestError>>()?;

        let n_trees = self.members.len() as f64;
        Ok((0..features.len())
            .map(|row| votes.iter().map(|tree_votes| tree_votes[row]).sum::<usize>() as f64 / n_trees)
            .collect())
    }

    /// Classify every row by majority vote.
    ///
    /// A row is class 1 only when strictly more than half of the trees vote 1;
    /// an exact tie resolves to class 0.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] if any row has the wrong width.
    pub fn classify(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, ForestError> {
        Ok(self
            .vote_share(features)?
            .into_iter()
            .map(|share| usize::from(share > 0.5))
            .collect())
    }

    /// Borrow the ensemble members in training order.
    #[must_use]
    pub fn members(&self) -> &[ForestMember] {
        &self.members
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.members.len()
    }
}
