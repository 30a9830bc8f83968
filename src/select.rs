//! Embedded L1 feature selection
//!
//! A sparsity-inducing logistic model is fit on each experiment's
//! subsample; columns with any non-zero fitted weight form a boolean
//! mask applied identically to the subsample and to the full table.
//! The mask is recomputed fresh every experiment, never reused.

use ndarray::{Array2, ArrayView2};

use crate::linear::{LogisticRegression, Penalty};
use crate::Result;

/// Inverse regularization strength of the selector model. Fixed
/// configuration constant.
pub const SELECTOR_C: f64 = 0.1;

/// Weights at or below this magnitude count as zeroed.
const ZERO_TOL: f64 = 1e-9;

/// Boolean column mask derived from an L1-penalized fit.
///
/// An all-false mask is representable: downstream training on the
/// resulting zero-width matrix fails with
/// [`Error::DegenerateSelection`](crate::Error::DegenerateSelection)
/// rather than silently fitting nothing.
#[derive(Debug, Clone)]
pub struct FeatureSelector {
    mask: Vec<bool>,
}

impl FeatureSelector {
    /// Fit the selector model and derive the column mask.
    ///
    /// # Errors
    ///
    /// Propagates training errors from the underlying model.
    pub fn fit(x: ArrayView2<'_, f64>, y: &[String]) -> Result<Self> {
        let mut model = LogisticRegression::new(Penalty::L1 { c: SELECTOR_C });
        model.fit(x, y)?;
        let weights = model.weights();
        let mask: Vec<bool> = (0..x.ncols())
            .map(|col| weights.column(col).iter().any(|w| w.abs() > ZERO_TOL))
            .collect();
        tracing::debug!(
            selected = mask.iter().filter(|m| **m).count(),
            total = mask.len(),
            "number of feats after selection"
        );
        Ok(Self { mask })
    }

    /// The boolean column mask.
    #[must_use]
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Number of selected columns.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.mask.iter().filter(|m| **m).count()
    }

    /// Names of the selected columns, for diagnostics.
    #[must_use]
    pub fn selected_names<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        self.mask
            .iter()
            .zip(names)
            .filter(|(kept, _)| **kept)
            .map(|(_, name)| name.as_str())
            .collect()
    }

    /// Narrow a feature matrix to the selected columns.
    ///
    /// Applied identically to the training subsample and the full table.
    #[must_use]
    pub fn select(&self, x: ArrayView2<'_, f64>) -> Array2<f64> {
        let kept: Vec<usize> = self
            .mask
            .iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(|(i, _)| i)
            .collect();
        let mut out = Array2::zeros((x.nrows(), kept.len()));
        for (j, &col) in kept.iter().enumerate() {
            out.column_mut(j).assign(&x.column(col));
        }
        out
    }
}
