//! k-fold cross-validation scoring
//!
//! Folds are contiguous near-equal slices of the subsample. No extra
//! shuffling happens here: the sampler already randomized row order, so
//! contiguous fold boundaries are effectively random.

use ndarray::{Array2, ArrayView2};

use crate::linear::{LogisticRegression, Penalty};
use crate::{Error, Result};

/// Fixed fold count.
pub const FOLDS: usize = 5;

/// One misclassified held-out row. Diagnostic data, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misclassification {
    /// Fold the row was held out in
    pub fold: usize,
    /// Gold (mapped) label
    pub gold: String,
    /// Predicted label
    pub predicted: String,
}

/// Cross-validation outcome for one experiment's subsample.
#[derive(Debug, Clone)]
pub struct CrossvalReport {
    /// Mean accuracy across folds, in [0,1]
    pub mean_accuracy: f64,
    /// Per-fold accuracies
    pub fold_scores: Vec<f64>,
    /// Gold/predicted pairs of every misclassified held-out row
    pub misclassified: Vec<Misclassification>,
}

/// Score a subsample with k contiguous folds.
///
/// Each fold trains a freshly initialized L2 model on the other folds and
/// measures accuracy on the held-out rows. Folds of unequal size are
/// permitted when the row count is not divisible by k.
///
/// # Errors
///
/// Returns [`Error::InsufficientData`] if there are fewer rows than
/// folds, and propagates training failures.
pub fn cross_validate(x: ArrayView2<'_, f64>, y: &[String]) -> Result<CrossvalReport> {
    let n = x.nrows();
    if n < FOLDS {
        return Err(Error::InsufficientData {
            rows: n,
            folds: FOLDS,
        });
    }

    let mut fold_scores = Vec::with_capacity(FOLDS);
    let mut misclassified = Vec::new();
    let mut start = 0;
    for fold in 0..FOLDS {
        // Near-equal partition: the first n % k folds get one extra row
        let size = n / FOLDS + usize::from(fold < n % FOLDS);
        let end = start + size;

        let train_rows: Vec<usize> = (0..start).chain(end..n).collect();
        let train_x = gather_rows(x, &train_rows);
        let train_y: Vec<String> = train_rows.iter().map(|&i| y[i].clone()).collect();

        let mut model = LogisticRegression::new(Penalty::L2 { c: 1.0 });
        model.fit(train_x.view(), &train_y)?;

        let held_x = x.slice(ndarray::s![start..end, ..]);
        let predicted = model.predict(held_x)?;
        let mut correct = 0usize;
        for (offset, prediction) in predicted.iter().enumerate() {
            let gold = &y[start + offset];
            if prediction == gold {
                correct += 1;
            } else {
                misclassified.push(Misclassification {
                    fold,
                    gold: gold.clone(),
                    predicted: prediction.clone(),
                });
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let score = correct as f64 / size as f64;
        tracing::debug!(fold, score, "crossval score");
        fold_scores.push(score);

        start = end;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean_accuracy = fold_scores.iter().sum::<f64>() / FOLDS as f64;
    if !misclassified.is_empty() {
        tracing::debug!(
            errors = misclassified.len(),
            "errors in classification: {:?}",
            misclassified
                .iter()
                .map(|m| format!("{}->{}", m.gold, m.predicted))
                .collect::<Vec<_>>()
        );
    }
    Ok(CrossvalReport {
        mean_accuracy,
        fold_scores,
        misclassified,
    })
}

/// Copy the given rows into a fresh matrix.
fn gather_rows(x: ArrayView2<'_, f64>, rows: &[usize]) -> Array2<f64> {
    let mut out = Array2::zeros((rows.len(), x.ncols()));
    for (i, &row) in rows.iter().enumerate() {
        out.row_mut(i).assign(&x.row(row));
    }
    out
}
