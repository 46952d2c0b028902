use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use grove_datasets::ClassificationConfig;
use grove_oob::{EnsembleConfiguration, ErrorRatePlot, ErrorRateTable, EstimatorRange, OobTrajectory};

const MIN_ESTIMATORS: usize = 50;
const MAX_ESTIMATORS: usize = 175;

const N_SAMPLES: usize = 500;
const N_FEATURES: usize = 25;
const N_INFORMATIVE: usize = 15;
const N_CLUSTERS_PER_CLASS: usize = 1;

#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "Out-of-bag error rate of random forests as trees are added")]
#[command(version)]
struct Cli {
    /// RNG seed for the dataset and every forest
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Where to write the SVG figure
    #[arg(long, default_value = "oob_error_rate.svg")]
    output: PathBuf,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct RunOutput {
    seed: u64,
    n_samples: usize,
    n_features: usize,
    range: EstimatorRange,
    plot: PathBuf,
    configurations: Vec<SeriesOutput>,
}

#[derive(Serialize)]
struct SeriesOutput {
    label: String,
    final_n_estimators: Option<usize>,
    final_oob_error: Option<f64>,
    min_n_estimators: Option<usize>,
    min_oob_error: Option<f64>,
}

fn summarize(table: &ErrorRateTable) -> Vec<SeriesOutput> {
    table
        .series()
        .iter()
        .map(|series| {
            let last = series.final_point();
            let best = series.min_point();
            SeriesOutput {
                label: series.label().to_string(),
                final_n_estimators: last.map(|p| p.n_estimators),
                final_oob_error: last.map(|p| p.oob_error),
                min_n_estimators: best.map(|p| p.n_estimators),
                min_oob_error: best.map(|p| p.oob_error),
            }
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let dataset = ClassificationConfig::new(N_SAMPLES, N_FEATURES)?
        .with_n_informative(N_INFORMATIVE)
        .with_n_clusters_per_class(N_CLUSTERS_PER_CLASS)
        .with_seed(cli.seed)
        .generate()
        .context("failed to generate dataset")?;
    info!(
        n_samples = dataset.n_samples(),
        n_features = dataset.n_features(),
        "dataset generated"
    );

    let mut configs = EnsembleConfiguration::standard(MIN_ESTIMATORS, cli.seed)
        .context("failed to build forest configurations")?;

    let trajectory = OobTrajectory::new(MIN_ESTIMATORS, MAX_ESTIMATORS)?;
    let table = trajectory
        .run(&dataset, &mut configs)
        .context("OOB error sweep failed")?;

    ErrorRatePlot::new()
        .with_caption("OOB error rate vs. ensemble size")
        .render(&table, &cli.output)
        .with_context(|| format!("failed to write plot to {}", cli.output.display()))?;

    let output = RunOutput {
        seed: cli.seed,
        n_samples: dataset.n_samples(),
        n_features: dataset.n_features(),
        range: trajectory.range(),
        plot: cli.output.clone(),
        configurations: summarize(&table),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
