//! Experiment orchestration
//!
//! One experiment is the full pipeline: stratified subsample, embedded L1
//! feature selection, k-fold scoring, then a final model trained on the
//! whole subsample and applied to every record in the table (seed and
//! non-seed alike). The orchestrator repeats that N times and collects
//! the results into an append-only run matrix. Experiments are
//! statistically independent; any failure aborts the whole run, since
//! partial ensembles of inconsistent size are not supported.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::crossval::cross_validate;
use crate::label::Granularity;
use crate::linear::{LogisticRegression, Penalty};
use crate::sample::draw_subsample;
use crate::select::FeatureSelector;
use crate::table::FeatureTable;
use crate::Result;

/// Outcome of a single experiment: one cross-validation score and one
/// predicted label per record of the full table. Immutable once produced.
#[derive(Debug, Clone)]
pub struct ExperimentResult {
    score: f64,
    predictions: Vec<String>,
}

impl ExperimentResult {
    /// Mean cross-validation accuracy of this experiment.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Predicted label per table record, in table order.
    #[must_use]
    pub fn predictions(&self) -> &[String] {
        &self.predictions
    }
}

/// Append-only ledger of experiment results.
///
/// All results share one feature table, one granularity and one set of
/// sampling quotas; the matrix is built once and never mutated in place
/// after a run completes.
#[derive(Debug, Clone)]
pub struct RunMatrix {
    granularity: Granularity,
    num_records: usize,
    results: Vec<ExperimentResult>,
}

impl RunMatrix {
    /// Create an empty run matrix for a table of the given size.
    #[must_use]
    pub const fn new(granularity: Granularity, num_records: usize) -> Self {
        Self {
            granularity,
            num_records,
            results: Vec::new(),
        }
    }

    /// Append one completed experiment.
    ///
    /// # Panics
    ///
    /// Panics if the result's prediction vector does not match the
    /// table size the matrix was created for; results from a different
    /// table are a logic error, not a runtime condition.
    pub fn push(&mut self, result: ExperimentResult) {
        assert_eq!(
            result.predictions.len(),
            self.num_records,
            "experiment result shape does not match run matrix"
        );
        self.results.push(result);
    }

    /// Active class granularity.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Number of records per experiment column.
    #[must_use]
    pub const fn num_records(&self) -> usize {
        self.num_records
    }

    /// Completed experiments, in run order.
    #[must_use]
    pub fn results(&self) -> &[ExperimentResult] {
        &self.results
    }

    /// Number of completed experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no experiment has completed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Run one experiment against the table with the given RNG state.
///
/// # Errors
///
/// Propagates sampling, selection and training failures; all are fatal
/// to the enclosing run.
pub fn run_experiment(
    table: &FeatureTable,
    granularity: Granularity,
    rng: &mut StdRng,
) -> Result<ExperimentResult> {
    let subsample = draw_subsample(table, granularity, rng)?;
    let selector = FeatureSelector::fit(subsample.features.view(), &subsample.labels)?;
    tracing::debug!(
        "selected features: {:?}",
        selector.selected_names(table.feature_names())
    );

    let train_x = selector.select(subsample.features.view());
    let report = cross_validate(train_x.view(), &subsample.labels)?;
    tracing::debug!(average = report.mean_accuracy, "crossval score");

    let mut model = LogisticRegression::new(Penalty::L2 { c: 1.0 });
    model.fit(train_x.view(), &subsample.labels)?;
    let all_x = selector.select(table.features());
    let predictions = model.predict(all_x.view())?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in &predictions {
        *counts.entry(label.as_str()).or_default() += 1;
    }
    tracing::debug!("labelings: {counts:?}");

    Ok(ExperimentResult {
        score: report.mean_accuracy,
        predictions,
    })
}

/// Run the configured number of experiments and collect the run matrix.
///
/// Sequential mode (the default) threads a single seeded RNG through all
/// experiments, so a run is bitwise reproducible for a given seed.
/// Parallel mode derives an independent RNG per experiment from the base
/// seed and executes on rayon workers; output for a given seed is still
/// deterministic, but differs from the sequential stream.
///
/// # Errors
///
/// The first failing experiment aborts the run; there is no skip policy.
pub fn run_ensemble(table: &FeatureTable, config: &Config) -> Result<RunMatrix> {
    let granularity = config.granularity()?;
    let mut matrix = RunMatrix::new(granularity, table.num_records());

    if config.parallel {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let results: Result<Vec<ExperimentResult>> = (0..config.experiment_count)
                .into_par_iter()
                .map(|i| {
                    let mut rng = StdRng::seed_from_u64(per_experiment_seed(config.seed, i));
                    run_experiment(table, granularity, &mut rng)
                })
                .collect();
            for result in results? {
                matrix.push(result);
            }
            tracing::info!(experiments = matrix.len(), "parallel ensemble complete");
            return Ok(matrix);
        }
        #[cfg(not(feature = "parallel"))]
        return Err(crate::Error::Config(
            "parallel execution requires the 'parallel' feature".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    for i in 0..config.experiment_count {
        let result = run_experiment(table, granularity, &mut rng)?;
        tracing::debug!(experiment = i, score = result.score(), "experiment complete");
        matrix.push(result);
    }
    tracing::info!(experiments = matrix.len(), "ensemble complete");
    Ok(matrix)
}

/// Derive a per-experiment seed from the base seed for parallel runs.
#[cfg(feature = "parallel")]
fn per_experiment_seed(base: u64, experiment: usize) -> u64 {
    base.wrapping_add(1 + experiment as u64)
}
