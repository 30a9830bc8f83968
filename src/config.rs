//! Run configuration
//!
//! All options are validated once at startup; an invalid configuration
//! is surfaced immediately as [`Error::Config`](crate::Error::Config)
//! and never retried.

use serde::{Deserialize, Serialize};

use crate::label::Granularity;
use crate::{Error, Result};

/// Configuration for one ensemble run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of independent experiments (default 100)
    pub experiment_count: usize,
    /// Class granularity: 2, 3, 4 or 5 (default 2)
    pub class_counts: u8,
    /// Cross-validation accuracy cutoff for the filtered consensus
    /// policies, in [0,1] (default 0.9)
    pub confidence_threshold: f64,
    /// Keep the two designated status columns as features
    pub use_status_features: bool,
    /// RNG seed; a sequential run is bitwise reproducible per seed
    pub seed: u64,
    /// Run experiments on rayon workers with per-experiment RNG streams
    /// instead of one sequential stream. Requires the `parallel` feature.
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            experiment_count: 100,
            class_counts: 2,
            confidence_threshold: 0.9,
            use_status_features: false,
            seed: 42,
            parallel: false,
        }
    }
}

impl Config {
    /// The active granularity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `class_counts` is not one of {2,3,4,5}.
    pub fn granularity(&self) -> Result<Granularity> {
        Granularity::from_classes(self.class_counts)
    }

    /// Validate the whole configuration at startup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on an invalid granularity, a confidence
    /// threshold outside [0,1], a zero experiment count, or a parallel
    /// run without the `parallel` feature compiled in.
    pub fn validate(&self) -> Result<()> {
        self.granularity()?;
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::Config(format!(
                "confidence threshold {} outside [0,1]",
                self.confidence_threshold
            )));
        }
        if self.experiment_count == 0 {
            return Err(Error::Config(
                "experiment count must be at least 1".to_string(),
            ));
        }
        if self.parallel && !cfg!(feature = "parallel") {
            return Err(Error::Config(
                "parallel execution requires the 'parallel' feature".to_string(),
            ));
        }
        Ok(())
    }
}
