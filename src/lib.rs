//! # lang-vitality: bootstrap ensemble vitality labeling
//!
//! Assigns a vitality/endangerment status to language records from a
//! small, noisy set of hand-labeled seeds. No single trained model is
//! trusted: the engine runs many independent weak experiments, each on a
//! fresh stratified seed subsample with its own embedded L1 feature
//! selection, and aggregates the resulting label columns into consensus
//! verdicts under explicit confidence and stability policies.
//!
//! ## Pipeline
//!
//! ```text
//! FeatureTable ──> SeedSampler ──> FeatureSelector ──> CrossValidator
//!                       │                                    │
//!                       └────────> FullSetLabeler <──────────┘
//!                                        │ × N experiments
//!                                    RunMatrix ──> ConsensusAggregator
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use lang_vitality::config::Config;
//! use lang_vitality::consensus::aggregate;
//! use lang_vitality::ensemble::run_ensemble;
//! use lang_vitality::table::FeatureTable;
//!
//! let config = Config::default();
//! config.validate()?;
//! let table = FeatureTable::load_tsv("preprocessed.tsv", config.use_status_features)?;
//! let matrix = run_ensemble(&table, &config)?;
//! let report = aggregate(&matrix, config.confidence_threshold);
//! # Ok::<(), lang_vitality::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod consensus;
pub mod crossval;
pub mod ensemble;
pub mod error;
pub mod export;
pub mod label;
pub mod linear;
pub mod sample;
pub mod select;
pub mod table;

pub use error::{Error, Result};
