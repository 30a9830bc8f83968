//! Linear classification
//!
//! One-vs-rest logistic regression trained by full-batch gradient descent.
//! This is the only model family in the engine: an L2-penalized model for
//! fold scoring and full-set labeling, and an L1-penalized model whose
//! sparse weights drive feature selection. The L1 penalty is applied as an
//! ISTA soft-threshold step, so uninformative columns reach exact zero.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::{Error, Result};

/// Regularization penalty. `c` is the inverse regularization strength:
/// smaller values mean a stronger penalty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Penalty {
    /// Sparsity-inducing penalty used by the feature selector.
    L1 {
        /// Inverse regularization strength
        c: f64,
    },
    /// Ridge penalty used by the scoring and labeling models.
    L2 {
        /// Inverse regularization strength
        c: f64,
    },
}

/// One-vs-rest logistic regression classifier.
///
/// Each distinct training label gets one binary subproblem; prediction
/// takes the class with the highest decision score. Models are cheap,
/// freshly initialized per fit, and never reused across experiments.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    penalty: Penalty,
    max_iter: usize,
    learning_rate: f64,
    classes: Vec<String>,
    weights: Array2<f64>,
    intercepts: Array1<f64>,
}

impl LogisticRegression {
    /// Create an untrained model with the given penalty.
    #[must_use]
    pub fn new(penalty: Penalty) -> Self {
        Self {
            penalty,
            max_iter: 500,
            learning_rate: 0.1,
            classes: Vec::new(),
            weights: Array2::zeros((0, 0)),
            intercepts: Array1::zeros(0),
        }
    }

    /// Distinct class labels seen during fitting, in first-seen order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Fitted weight matrix, one row per class subproblem.
    #[must_use]
    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// Fit the model on a feature matrix and its row labels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DegenerateSelection`] when the feature matrix has
    /// zero columns (selection collapsed upstream), and [`Error::Storage`]
    /// on a row/label count mismatch or an empty training set.
    pub fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[String]) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(Error::Storage(format!(
                "training rows ({}) and labels ({}) disagree",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(Error::Storage("empty training set".to_string()));
        }
        if x.ncols() == 0 {
            return Err(Error::DegenerateSelection);
        }

        self.classes.clear();
        for label in y {
            if !self.classes.iter().any(|c| c == label) {
                self.classes.push(label.clone());
            }
        }

        let n_classes = self.classes.len();
        self.weights = Array2::zeros((n_classes, x.ncols()));
        self.intercepts = Array1::zeros(n_classes);

        for (k, class) in self.classes.iter().enumerate() {
            let targets: Vec<f64> = y
                .iter()
                .map(|label| if label == class { 1.0 } else { 0.0 })
                .collect();
            let (w, b) = self.fit_binary(x, &targets);
            self.weights.row_mut(k).assign(&w);
            self.intercepts[k] = b;
        }
        Ok(())
    }

    /// Train one binary subproblem with gradient descent.
    fn fit_binary(&self, x: ArrayView2<'_, f64>, targets: &[f64]) -> (Array1<f64>, f64) {
        let n = x.nrows() as f64;
        let lambda = match self.penalty {
            Penalty::L1 { c } | Penalty::L2 { c } => 1.0 / (c * n),
        };
        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0f64;

        for _ in 0..self.max_iter {
            let mut grad_w = Array1::<f64>::zeros(x.ncols());
            let mut grad_b = 0.0f64;
            for (i, row) in x.rows().into_iter().enumerate() {
                let residual = sigmoid(row.dot(&w) + b) - targets[i];
                grad_w.scaled_add(residual, &row);
                grad_b += residual;
            }
            grad_w /= n;
            grad_b /= n;

            match self.penalty {
                Penalty::L2 { .. } => {
                    grad_w.scaled_add(lambda, &w);
                    w.scaled_add(-self.learning_rate, &grad_w);
                }
                Penalty::L1 { .. } => {
                    // Proximal step: plain gradient on the data loss,
                    // then soft-threshold toward exact zeros.
                    w.scaled_add(-self.learning_rate, &grad_w);
                    let shrink = self.learning_rate * lambda;
                    w.mapv_inplace(|v| soft_threshold(v, shrink));
                }
            }
            // Intercept is unpenalized
            b -= self.learning_rate * grad_b;
        }
        (w, b)
    }

    /// Decision score of one row for one class subproblem.
    fn score(&self, row: ArrayView1<'_, f64>, k: usize) -> f64 {
        row.dot(&self.weights.row(k)) + self.intercepts[k]
    }

    /// Predict a class label for every row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the model is unfitted or the feature
    /// width differs from the training width.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<String>> {
        if self.classes.is_empty() {
            return Err(Error::Storage("predict called on unfitted model".to_string()));
        }
        if x.ncols() != self.weights.ncols() {
            return Err(Error::Storage(format!(
                "feature width {} differs from training width {}",
                x.ncols(),
                self.weights.ncols()
            )));
        }
        let mut out = Vec::with_capacity(x.nrows());
        for row in x.rows() {
            let mut best = 0;
            let mut best_score = self.score(row, 0);
            for k in 1..self.classes.len() {
                let s = self.score(row, k);
                if s > best_score {
                    best_score = s;
                    best = k;
                }
            }
            out.push(self.classes[best].clone());
        }
        Ok(out)
    }
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[inline]
fn soft_threshold(value: f64, shrink: f64) -> f64 {
    if value > shrink {
        value - shrink
    } else if value < -shrink {
        value + shrink
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_separable_binary_problem() {
        let x = array![[2.0], [1.5], [2.5], [-2.0], [-1.5], [-2.5]];
        let y = labels(&["pos", "pos", "pos", "neg", "neg", "neg"]);
        let mut model = LogisticRegression::new(Penalty::L2 { c: 1.0 });
        model.fit(x.view(), &y).unwrap();
        assert_eq!(model.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn test_three_class_one_vs_rest() {
        // Three clusters along two axes
        let x = array![
            [3.0, 0.0],
            [2.5, 0.2],
            [0.0, 3.0],
            [0.1, 2.6],
            [-3.0, -3.0],
            [-2.4, -2.8],
        ];
        let y = labels(&["a", "a", "b", "b", "c", "c"]);
        let mut model = LogisticRegression::new(Penalty::L2 { c: 1.0 });
        model.fit(x.view(), &y).unwrap();
        assert_eq!(model.predict(x.view()).unwrap(), y);
        assert_eq!(model.classes(), ["a", "b", "c"]);
    }

    #[test]
    fn test_l1_zeroes_noise_column() {
        // Column 0 separates the classes, column 1 is constant noise
        let x = array![
            [2.0, 0.5],
            [2.2, 0.5],
            [1.8, 0.5],
            [-2.0, 0.5],
            [-2.2, 0.5],
            [-1.8, 0.5],
        ];
        let y = labels(&["pos", "pos", "pos", "neg", "neg", "neg"]);
        let mut model = LogisticRegression::new(Penalty::L1 { c: 0.1 });
        model.fit(x.view(), &y).unwrap();
        let weights = model.weights();
        assert!(weights.column(0).iter().any(|w| w.abs() > 1e-6));
        assert!(weights.column(1).iter().all(|w| w.abs() < 1e-9));
    }

    #[test]
    fn test_zero_width_matrix_is_degenerate() {
        let x = Array2::<f64>::zeros((4, 0));
        let y = labels(&["a", "a", "b", "b"]);
        let mut model = LogisticRegression::new(Penalty::L2 { c: 1.0 });
        assert!(matches!(
            model.fit(x.view(), &y),
            Err(Error::DegenerateSelection)
        ));
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = LogisticRegression::new(Penalty::L2 { c: 1.0 });
        let x = array![[1.0]];
        assert!(model.predict(x.view()).is_err());
    }

    #[test]
    fn test_row_label_mismatch() {
        let x = array![[1.0], [2.0]];
        let y = labels(&["a"]);
        let mut model = LogisticRegression::new(Penalty::L2 { c: 1.0 });
        assert!(model.fit(x.view(), &y).is_err());
    }
}
