//! Accuracy regression tests for sapling-forest.
//!
//! These tests pin the greedy induction against a known boolean concept and
//! check that the forest stays accurate and reproducible on a deterministic
//! synthetic dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use sapling_forest::{
    DecisionTree, DecisionTreeConfig, Node, NodeIndex, RandomForestConfig, SplitRule, accuracy,
    confusion_matrix,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Hand-built reference tree over four boolean features.
///
/// x0 = 1 gives 1. Otherwise x3 = 0 tests x2 and x3 = 1 tests x1, each
/// answering 0 when the tested feature is 1.
fn reference_tree() -> DecisionTree {
    let nodes = vec![
        Node::split(SplitRule::new(0, 0.5), NodeIndex::new(1), NodeIndex::new(8)),
        Node::split(SplitRule::new(3, 0.5), NodeIndex::new(2), NodeIndex::new(5)),
        Node::split(SplitRule::new(2, 0.5), NodeIndex::new(3), NodeIndex::new(4)),
        Node::leaf(1),
        Node::leaf(0),
        Node::split(SplitRule::new(1, 0.5), NodeIndex::new(6), NodeIndex::new(7)),
        Node::leaf(1),
        Node::leaf(0),
        Node::leaf(1),
    ];
    DecisionTree::from_nodes(nodes, 4).unwrap()
}

/// All 16 vectors over four boolean features.
fn boolean_cube() -> Vec<Vec<f64>> {
    (0..16u32)
        .map(|bits| (0..4).map(|f| f64::from((bits >> f) & 1)).collect())
        .collect()
}

/// Generate a 300-sample, 10-feature binary classification dataset.
///
/// Features 0-2 are informative (class * 3.0 + noise in [0, 0.5]).
/// Features 3-9 are pure noise in [0, 0.5].
/// Samples alternate between the two classes.
fn make_classification(seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n_samples = 300;
    let n_features = 10;

    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % 2;
        labels.push(class);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 3 { class as f64 * 3.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 0.5
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

// ---------------------------------------------------------------------------
// Single tree
// ---------------------------------------------------------------------------

#[test]
fn reference_tree_concept() {
    let tree = reference_tree();
    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.decide(&[1.0, 1.0, 1.0, 1.0]).unwrap(), 1);
    assert_eq!(tree.decide(&[0.0, 0.0, 1.0, 0.0]).unwrap(), 0);
    assert_eq!(tree.decide(&[0.0, 0.0, 0.0, 0.0]).unwrap(), 1);
    assert_eq!(tree.decide(&[0.0, 1.0, 0.0, 1.0]).unwrap(), 0);
    assert_eq!(tree.decide(&[0.0, 0.0, 1.0, 1.0]).unwrap(), 1);
}

/// An unbounded tree fitted on the reference tree's own labelling of the
/// boolean cube must reproduce that labelling exactly.
#[test]
fn unbounded_tree_reproduces_boolean_concept() {
    let cube = boolean_cube();
    let labels = reference_tree().classify(&cube).unwrap();

    let learned = DecisionTreeConfig::new().fit(&cube, &labels).unwrap();
    let predicted = learned.classify(&cube).unwrap();

    assert_eq!(predicted, labels);
    assert!((accuracy(&predicted, &labels).unwrap() - 1.0).abs() < f64::EPSILON);
    assert!(learned.depth() <= 4);
}

#[test]
fn depth_one_tree_is_a_stump() {
    let cube = boolean_cube();
    let labels = reference_tree().classify(&cube).unwrap();

    let stump = DecisionTreeConfig::new()
        .with_depth_limit(Some(1))
        .fit(&cube, &labels)
        .unwrap();
    assert_eq!(stump.n_nodes(), 3);
    assert_eq!(stump.depth(), 1);
}

// ---------------------------------------------------------------------------
// Forest
// ---------------------------------------------------------------------------

/// Held-out accuracy with 50 trees must exceed 0.9.
#[test]
fn forest_holdout_accuracy_above_threshold() {
    let (train_x, train_y) = make_classification(42);
    let (test_x, test_y) = make_classification(7);

    let forest = RandomForestConfig::new(50)
        .unwrap()
        .with_attr_subsample_rate(0.5)
        .with_seed(42)
        .fit(&train_x, &train_y)
        .unwrap();
    let predicted = forest.classify(&test_x).unwrap();

    let acc = accuracy(&predicted, &test_y).unwrap();
    assert!(acc > 0.9, "holdout accuracy {acc} <= 0.9");

    let cm = confusion_matrix(&predicted, &test_y).unwrap();
    assert_eq!(cm.total(), test_y.len());
}

/// A depth limit of 1 still separates the informative features.
#[test]
fn shallow_forest_accuracy() {
    let (features, labels) = make_classification(42);
    let forest = RandomForestConfig::new(20)
        .unwrap()
        .with_depth_limit(Some(1))
        .with_seed(3)
        .fit(&features, &labels)
        .unwrap();
    for member in forest.members() {
        assert!(member.tree().depth() <= 1);
    }
    let acc = accuracy(&forest.classify(&features).unwrap(), &labels).unwrap();
    assert!(acc > 0.9, "training accuracy {acc} <= 0.9");
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn same_seed_same_predictions() {
    let (features, labels) = make_classification(42);
    let config = RandomForestConfig::new(15)
        .unwrap()
        .with_example_subsample_rate(0.5)
        .with_attr_subsample_rate(0.3)
        .with_seed(1234);

    let first = config.fit(&features, &labels).unwrap();
    let second = config.fit(&features, &labels).unwrap();
    assert_eq!(
        first.vote_share(&features).unwrap(),
        second.vote_share(&features).unwrap()
    );
}

/// Thread count must not change what each tree sees.
#[test]
fn thread_count_does_not_change_forest() {
    let (features, labels) = make_classification(42);
    let config = RandomForestConfig::new(12)
        .unwrap()
        .with_attr_subsample_rate(0.4)
        .with_seed(5);

    let fit_with = |threads: usize| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
            .install(|| config.fit(&features, &labels).unwrap())
    };
    let serial = fit_with(1);
    let parallel = fit_with(4);

    for (a, b) in serial.members().iter().zip(parallel.members()) {
        assert_eq!(a.columns(), b.columns());
        assert_eq!(a.tree().n_nodes(), b.tree().n_nodes());
    }
    assert_eq!(
        serial.classify(&features).unwrap(),
        parallel.classify(&features).unwrap()
    );
}
