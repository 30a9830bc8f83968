//! Error types for lang-vitality
//!
//! The engine favors failing loud over producing a statistically
//! compromised ensemble: no error is swallowed and nothing is retried.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// lang-vitality error types
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration (granularity, threshold, experiment count)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A seed class has fewer eligible records than its sampling quota
    #[error("Insufficient seeds for class '{label}': {available} available, quota is {quota}")]
    InsufficientSeeds {
        /// Raw seed class that ran dry
        label: char,
        /// Eligible records in that class
        available: usize,
        /// Configured per-class quota
        quota: usize,
    },

    /// Subsample too small to partition into cross-validation folds
    #[error("Insufficient data for cross-validation: {rows} rows, need at least {folds}")]
    InsufficientData {
        /// Rows in the subsample
        rows: usize,
        /// Configured fold count
        folds: usize,
    },

    /// L1 feature selection zeroed every column; training on zero
    /// features is refused rather than silently fit
    #[error("Degenerate feature selection: no feature columns remain for training")]
    DegenerateSelection,

    /// Feature table load/parse error (ragged rows, non-numeric cells)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_seeds_message() {
        let err = Error::InsufficientSeeds {
            label: 'g',
            available: 3,
            quota: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("'g'"));
        assert!(msg.contains("3 available"));
        assert!(msg.contains("quota is 5"));
    }

    #[test]
    fn test_degenerate_selection_message() {
        let err = Error::DegenerateSelection;
        assert!(err.to_string().contains("no feature columns"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
