//! CLI entry point for the vitality ensemble classifier.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lang_vitality::config::Config;
use lang_vitality::consensus::{aggregate, log_summary};
use lang_vitality::ensemble::run_ensemble;
use lang_vitality::export::export_tsv;
use lang_vitality::table::FeatureTable;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bootstrap ensemble vitality labeling", long_about = None)]
struct Args {
    /// Preprocessed data file in tsv format
    input_tsv: PathBuf,

    /// File for writing labelings
    output_fn: PathBuf,

    /// Number of experiments with random seed sets
    #[arg(short, long, env = "EXPERIMENT_COUNT", default_value = "100")]
    experiment_count: usize,

    /// 2 - still/historic vs. vital/thriving/global,
    /// 3 - still/historic vs. vital vs. thriving/global,
    /// 4 - still vs. historic vs. vital vs. thriving/global,
    /// 5 - still vs. historic vs. thriving vs. vital vs. global
    #[arg(short, long, env = "CLASS_COUNTS", default_value = "2")]
    class_counts: u8,

    /// Lower limit on cross-validation accuracy for counting statistics
    /// on 'filtered' labelings
    #[arg(short, long, env = "THRESHOLD", default_value = "0.9")]
    threshold: f64,

    /// Use status features
    #[arg(short = 's', long)]
    status: bool,

    /// RNG seed for reproducible runs
    #[arg(long, env = "SEED", default_value = "42")]
    seed: u64,

    /// Run experiments in parallel (requires the 'parallel' feature;
    /// abandons sequential bitwise reproducibility)
    #[arg(long)]
    parallel: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run(&Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = Config {
        experiment_count: args.experiment_count,
        class_counts: args.class_counts,
        confidence_threshold: args.threshold,
        use_status_features: args.status,
        seed: args.seed,
        parallel: args.parallel,
    };
    config.validate().context("invalid configuration")?;

    let table = FeatureTable::load_tsv(&args.input_tsv, config.use_status_features)
        .with_context(|| format!("failed to load {}", args.input_tsv.display()))?;
    tracing::info!(
        records = table.num_records(),
        features = table.num_features(),
        seeds = table.seed_count(),
        "feature table loaded"
    );

    let matrix = run_ensemble(&table, &config).context("ensemble run failed")?;
    let report = aggregate(&matrix, config.confidence_threshold);
    log_summary(&matrix, &report, config.confidence_threshold);

    export_tsv(&args.output_fn, &table, &matrix, &report)
        .with_context(|| format!("failed to write {}", args.output_fn.display()))?;
    Ok(())
}
