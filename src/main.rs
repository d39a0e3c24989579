use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sapling_forest::{ConfusionMatrix, DecisionTreeConfig, RandomForestConfig, confusion_matrix};
use sapling_io::{CsvLoader, LabelColumn, LabelledData};

#[derive(Parser)]
#[command(name = "sapling")]
#[command(about = "Binary decision tree and random forest classification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Arguments shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to the training CSV file (headerless, numeric)
    #[arg(long)]
    train: PathBuf,

    /// Path to the evaluation CSV file (defaults to the training file)
    #[arg(long)]
    test: Option<PathBuf>,

    /// Which column holds the label: "first" or "last"
    #[arg(long, default_value = "last")]
    label_column: String,

    /// Maximum tree depth (unlimited if not set)
    #[arg(long)]
    depth_limit: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Fit a single decision tree and evaluate it
    Tree {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Fit a random forest and evaluate it
    Forest {
        #[command(flatten)]
        data: DataArgs,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 5)]
        num_trees: usize,

        /// Bootstrap size per tree as a multiple of the training row count
        #[arg(long, default_value_t = 0.5)]
        example_rate: f64,

        /// Fraction of feature columns each tree sees
        #[arg(long, default_value_t = 0.5)]
        attr_rate: f64,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct EvaluationOutput {
    model: &'static str,
    train: String,
    test: String,
    n_train: usize,
    n_test: usize,
    n_features: usize,
    accuracy: Option<f64>,
    precision: Option<f64>,
    recall: Option<f64>,
    /// `[[TP, FN], [FP, TN]]`
    confusion_matrix: [[usize; 2]; 2],
    model_size: ModelSize,
}

#[derive(Serialize)]
struct ModelSize {
    n_trees: usize,
    n_nodes: usize,
    max_depth: usize,
}

fn load(path: &Path, label_column: LabelColumn) -> Result<LabelledData> {
    CsvLoader::new(path, label_column)
        .read()
        .with_context(|| format!("failed to load {}", path.display()))
}

/// Load the training set and, if distinct, the evaluation set.
fn load_pair(args: &DataArgs) -> Result<(LabelledData, LabelledData)> {
    let label_column: LabelColumn = args
        .label_column
        .parse()
        .context("invalid --label-column")?;
    let train = load(&args.train, label_column)?;
    let test = match &args.test {
        Some(path) => load(path, label_column)?,
        None => train.clone(),
    };
    Ok((train, test))
}

fn build_output(
    model: &'static str,
    args: &DataArgs,
    train: &LabelledData,
    test: &LabelledData,
    cm: &ConfusionMatrix,
    model_size: ModelSize,
) -> EvaluationOutput {
    EvaluationOutput {
        model,
        train: args.train.display().to_string(),
        test: args.test.as_ref().unwrap_or(&args.train).display().to_string(),
        n_train: train.n_samples(),
        n_test: test.n_samples(),
        n_features: train.n_features(),
        accuracy: cm.accuracy().ok(),
        precision: cm.precision().ok(),
        recall: cm.recall().ok(),
        confusion_matrix: cm.as_rows(),
        model_size,
    }
}

/// `--verbose` and `--quiet` override `RUST_LOG`; otherwise `RUST_LOG` applies,
/// falling back to `info`.
fn log_filter(verbose: bool, quiet: bool) -> EnvFilter {
    match (verbose, quiet) {
        (true, _) => EnvFilter::new("debug"),
        (_, true) => EnvFilter::new("error"),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, cli.quiet))
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let output = match cli.command {
        Command::Tree { data } => {
            let (train, test) = load_pair(&data)?;

            let tree = DecisionTreeConfig::new()
                .with_depth_limit(data.depth_limit)
                .fit(train.features(), train.labels())
                .context("decision tree training failed")?;
            info!(
                n_nodes = tree.n_nodes(),
                n_leaves = tree.n_leaves(),
                depth = tree.depth(),
                "decision tree trained"
            );

            let predicted = tree
                .classify(test.features())
                .context("decision tree classification failed")?;
            let cm = confusion_matrix(&predicted, test.labels())
                .context("failed to compute confusion matrix")?;

            let size = ModelSize {
                n_trees: 1,
                n_nodes: tree.n_nodes(),
                max_depth: tree.depth(),
            };
            build_output("tree", &data, &train, &test, &cm, size)
        }

        Command::Forest {
            data,
            num_trees,
            example_rate,
            attr_rate,
        } => {
            let (train, test) = load_pair(&data)?;

            let config = RandomForestConfig::new(num_trees)
                .context("invalid forest configuration")?
                .with_depth_limit(data.depth_limit)
                .with_example_subsample_rate(example_rate)
                .with_attr_subsample_rate(attr_rate)
                .with_seed(cli.seed);
            let forest = config
                .fit(train.features(), train.labels())
                .context("random forest training failed")?;

            let predicted = forest
                .classify(test.features())
                .context("random forest classification failed")?;
            let cm = confusion_matrix(&predicted, test.labels())
                .context("failed to compute confusion matrix")?;
            info!(%cm, "evaluation complete");

            let size = ModelSize {
                n_trees: forest.n_trees(),
                n_nodes: forest.members().iter().map(|m| m.tree().n_nodes()).sum(),
                max_depth: forest
                    .members()
                    .iter()
                    .map(|m| m.tree().depth())
                    .max()
                    .unwrap_or(0),
            };
            build_output("forest", &data, &train, &test, &cm, size)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_flag_wins() {
        assert_eq!(log_filter(true, true).to_string(), "debug");
    }

    #[test]
    fn quiet_flag_sets_error() {
        assert_eq!(log_filter(false, true).to_string(), "error");
    }

    #[test]
    fn cli_parses_forest_subcommand() {
        let cli = Cli::try_parse_from([
            "sapling", "--seed", "7", "forest", "--train", "data.csv", "--num-trees", "3",
        ])
        .unwrap();
        assert_eq!(cli.seed, 7);
        assert!(matches!(cli.command, Command::Forest { num_trees: 3, .. }));
    }
}
