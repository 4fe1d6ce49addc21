//! Logistic regression classifier.

use crate::error::{PreprocessingError, Result};
use ndarray::{Array1, Array2, Axis, s};

/// L2-regularized logistic regression fitted by damped Newton steps.
///
/// Minimizes the mean log loss plus `||w||^2 / (2 C n)`, with `w` measured on
/// the raw feature scale and the intercept unpenalized. Features are
/// standardized internally for conditioning only; the penalty is rescaled so
/// the fitted boundary matches a fit on unscaled features. Targets with more
/// than two classes are handled one-vs-rest.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Inverse regularization strength
    pub c: f64,
    /// Maximum iterations per binary model
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    /// Sorted class labels seen during fitting
    pub classes: Vec<f64>,
    /// One row of coefficients per binary model
    pub coefficients: Option<Array2<f64>>,
    /// One intercept per binary model
    pub intercepts: Option<Array1<f64>>,
    feature_mean: Option<Array1<f64>>,
    feature_std: Option<Array1<f64>>,
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-8,
            classes: Vec::new(),
            coefficients: None,
            intercepts: None,
            feature_mean: None,
            feature_std: None,
            is_fitted: false,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Fit the model. `y` holds one class label per row of `x`.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(PreprocessingError::ShapeMismatch {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let mut classes: Vec<f64> = y.to_vec();
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup();
        if classes.len() < 2 {
            return Err(PreprocessingError::InsufficientClasses(classes.len()));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or(PreprocessingError::EmptyPartition("train"))?;
        let std = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });
        let xs = (x - &mean) / &std;

        // A single model separates the two classes of a binary target
        let positives: &[f64] = if classes.len() == 2 {
            &classes[1..]
        } else {
            &classes
        };

        let mut coefficients: Array2<f64> = Array2::zeros((positives.len(), x.ncols()));
        let mut intercepts: Array1<f64> = Array1::zeros(positives.len());
        for (k, positive) in positives.iter().enumerate() {
            let target = y.mapv(|label| if label == *positive { 1.0 } else { 0.0 });
            let (weights, bias) = self.fit_binary(&xs, &target, &std);
            coefficients.row_mut(k).assign(&weights);
            intercepts[k] = bias;
        }

        self.classes = classes;
        self.coefficients = Some(coefficients);
        self.intercepts = Some(intercepts);
        self.feature_mean = Some(mean);
        self.feature_std = Some(std);
        self.is_fitted = true;

        Ok(self)
    }

    /// Fit one binary model on standardized features. `scale` holds the
    /// standard deviation of each feature, so `w / scale` is the raw-scale
    /// coefficient the penalty applies to.
    fn fit_binary(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        scale: &Array1<f64>,
    ) -> (Array1<f64>, f64) {
        let n_samples = x.nrows() as f64;
        let n_features = x.ncols();
        let alpha = 1.0 / (self.c * n_samples);
        let penalty = scale.mapv(|s| alpha / (s * s));

        let objective = |weights: &Array1<f64>, bias: f64| -> f64 {
            let linear = x.dot(weights) + bias;
            let loss = linear
                .iter()
                .zip(y.iter())
                .map(|(z, t)| softplus(*z) - t * z)
                .sum::<f64>()
                / n_samples;
            loss + 0.5 * (&penalty * weights * weights).sum()
        };

        let mut weights: Array1<f64> = Array1::zeros(n_features);
        let mut bias: f64 = 0.0;
        let mut current = objective(&weights, bias);

        for _iter in 0..self.max_iter {
            let linear = x.dot(&weights) + bias;
            let p = Self::sigmoid(&linear);
            let errors = &p - y;

            let dw = (x.t().dot(&errors) / n_samples) + (&penalty * &weights);
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            // Hessian over [w, b]; the bias occupies the last row and column
            let curvature = p.mapv(|v| v * (1.0 - v));
            let mut hessian: Array2<f64> = Array2::zeros((n_features + 1, n_features + 1));
            let weighted = x * &curvature.view().insert_axis(Axis(1));
            hessian
                .slice_mut(s![..n_features, ..n_features])
                .assign(&(x.t().dot(&weighted) / n_samples));
            let cross = weighted.sum_axis(Axis(0)) / n_samples;
            hessian.slice_mut(s![..n_features, n_features]).assign(&cross);
            hessian.slice_mut(s![n_features, ..n_features]).assign(&cross);
            hessian[[n_features, n_features]] = curvature.sum() / n_samples;
            for j in 0..n_features {
                hessian[[j, j]] += penalty[j];
            }

            let mut gradient: Array1<f64> = Array1::zeros(n_features + 1);
            gradient.slice_mut(s![..n_features]).assign(&dw);
            gradient[n_features] = db;

            // Saturated curvature leaves a singular Hessian; fall back to the gradient
            let direction = cholesky_solve(&hessian, &gradient).unwrap_or_else(|| gradient.clone());
            let slope = gradient.dot(&direction);

            // Halve the step until the objective decreases enough
            let mut step: f64 = 1.0;
            let mut accepted = false;
            while step > 1e-10 {
                let candidate_w = &weights - &(step * &direction.slice(s![..n_features]));
                let candidate_b = bias - step * direction[n_features];
                let value = objective(&candidate_w, candidate_b);
                if value <= current - 1e-4 * step * slope {
                    weights = candidate_w;
                    bias = candidate_b;
                    current = value;
                    accepted = true;
                    break;
                }
                step *= 0.5;
            }
            if !accepted {
                break;
            }
        }

        (weights, bias)
    }

    /// Class probabilities, one column per entry of [`Self::classes`].
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (Some(coefficients), Some(intercepts), Some(mean), Some(std)) = (
            &self.coefficients,
            &self.intercepts,
            &self.feature_mean,
            &self.feature_std,
        ) else {
            return Err(PreprocessingError::ModelNotFitted);
        };

        if x.ncols() != mean.len() {
            return Err(PreprocessingError::ShapeMismatch {
                expected: format!("{} features", mean.len()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let xs = (x - mean) / std;
        let mut scores = xs.dot(&coefficients.t()) + intercepts;
        scores.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp()));

        if self.classes.len() == 2 {
            let positive = scores.column(0).to_owned();
            let mut proba: Array2<f64> = Array2::zeros((x.nrows(), 2));
            proba.column_mut(0).assign(&positive.mapv(|p| 1.0 - p));
            proba.column_mut(1).assign(&positive);
            return Ok(proba);
        }

        for mut row in scores.rows_mut() {
            let total = row.sum();
            if total > 0.0 {
                row /= total;
            }
        }
        Ok(scores)
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                let best = row
                    .iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |acc, (i, p)| {
                        if *p > acc.1 { (i, *p) } else { acc }
                    })
                    .0;
                self.classes[best]
            })
            .collect())
    }

    /// Get accuracy score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        if y.is_empty() {
            return Err(PreprocessingError::EmptyPartition("test"));
        }
        let y_pred = self.predict(x)?;

        let correct = y_pred
            .iter()
            .zip(y.iter())
            .filter(|(pred, actual)| pred == actual)
            .count();

        Ok(correct as f64 / y.len() as f64)
    }
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

/// Solve the symmetric positive-definite system `a x = b` by Cholesky
/// decomposition, retrying once with a small ridge on the diagonal.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    cholesky_solve_with_ridge(a, b, 0.0).or_else(|| {
        let n = a.nrows();
        let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
        cholesky_solve_with_ridge(a, b, ridge.max(1e-12))
    })
}

fn cholesky_solve_with_ridge(a: &Array2<f64>, b: &Array1<f64>, ridge: f64) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    // A = L * L^T
    let mut l: Array2<f64> = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] + ridge - sum;
                if !diag.is_finite() || diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L * y = b
    let mut y: Array1<f64> = Array1::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * y[j]).sum();
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T * x = y
    let mut x: Array1<f64> = Array1::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            rows.push(i as f64);
            labels.push(0.0);
            rows.push(100.0 + i as f64);
            labels.push(1.0);
        }
        let n = labels.len();
        (
            Array2::from_shape_vec((n, 1), rows).unwrap(),
            Array1::from_vec(labels),
        )
    }

    #[test]
    fn test_logistic_separable() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        assert!(model.is_fitted);
        assert_eq!(model.classes, vec![0.0, 1.0]);
        assert_eq!(model.score(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_penalty_applies_on_raw_feature_scale() {
        let x = Array2::from_shape_vec((10, 1), (1..=10).map(f64::from).collect()).unwrap();
        let y = array![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0];
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        // Boundary of the C = 1 optimum on unscaled x sits near 8.6
        assert_eq!(model.predict(&array![[8.0], [9.0]]).unwrap(), array![0.0, 1.0]);
        assert_eq!(model.score(&x, &y).unwrap(), 1.0);

        let proba = model.predict_proba(&array![[8.6]]).unwrap();
        assert!((proba[[0, 1]] - 0.5).abs() < 0.1, "p = {}", proba[[0, 1]]);
    }

    #[test]
    fn test_cholesky_solve() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 1.0];
        let x = cholesky_solve(&a, &b).unwrap();
        assert!((x[0] - 0.5).abs() < 1e-12);
        assert!(x[1].abs() < 1e-12);
        assert!(cholesky_solve(&array![[0.0, 0.0], [0.0, -1.0]], &b).is_none());
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new().with_max_iter(50);
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&array![[0.0], [109.0]]).unwrap();
        assert_eq!(proba.ncols(), 2);
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
        assert!(proba[[0, 0]] > 0.5);
        assert!(proba[[1, 1]] > 0.5);
    }

    #[test]
    fn test_multiclass_one_vs_rest() {
        let x = array![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [10.0, 0.0],
            [11.0, 0.0],
            [10.0, 1.0],
            [11.0, 1.0],
            [0.0, 10.0],
            [1.0, 10.0],
            [0.0, 11.0],
            [1.0, 11.0],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0];

        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.classes.len(), 3);
        assert_eq!(model.coefficients.as_ref().unwrap().nrows(), 3);
        let accuracy = model.score(&x, &y).unwrap();
        assert!(accuracy >= 0.9, "accuracy = {}", accuracy);
    }

    #[test]
    fn test_constant_feature_is_tolerated() {
        let x = array![[1.0, 5.0], [2.0, 5.0], [8.0, 5.0], [9.0, 5.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.score(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 1.0];
        let result = LogisticRegression::new().fit(&x, &y).map(|_| ());
        assert!(matches!(
            result,
            Err(PreprocessingError::InsufficientClasses(1))
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let x = array![[1.0], [2.0]];
        let y = array![0.0];
        let result = LogisticRegression::new().fit(&x, &y).map(|_| ());
        assert!(matches!(result, Err(PreprocessingError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LogisticRegression::new();
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(PreprocessingError::ModelNotFitted)
        ));
    }
}
