//! L2-regularized logistic regression fitted with L-BFGS.

#![allow(non_snake_case)]

use super::{Classifier, ModelError};
use ndarray::{s, Array1, Array2};
use std::collections::VecDeque;

/// Correction pairs kept by the quasi-Newton update.
const HISTORY: usize = 10;
/// Relative objective decrease below which the fit stops.
const FTOL: f64 = 2.2e-9;

/// Binary logistic regression; the intercept is not penalized.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Inverse regularization strength.
    c: f64,
    max_iter: usize,
    /// Largest absolute gradient component accepted as converged.
    tol: f64,
    coef: Option<Array1<f64>>,
    intercept: f64,
    n_iter: usize,
}

/// Training data bound to the penalized objective. Parameters are packed as
/// `[coef..., intercept]`.
struct Objective<'a> {
    X: &'a Array2<f64>,
    y: Array1<f64>,
    alpha: f64,
}

impl Objective<'_> {
    /// Penalized negative log-likelihood and its gradient.
    fn evaluate(&self, theta: &Array1<f64>) -> (f64, Array1<f64>) {
        let p = self.X.ncols();
        let coef = theta.slice(s![..p]);
        let z = self.X.dot(&coef) + theta[p];

        let data: f64 = z
            .iter()
            .zip(self.y.iter())
            .map(|(&z, &y)| log1p_exp(z) - y * z)
            .sum();
        let loss = data + 0.5 * self.alpha * coef.dot(&coef);

        let residual = z.mapv(sigmoid) - &self.y;
        let mut grad = Array1::zeros(p + 1);
        grad.slice_mut(s![..p])
            .assign(&(self.X.t().dot(&residual) + &coef * self.alpha));
        grad[p] = residual.sum();
        (loss, grad)
    }
}

impl LogisticRegression {
    pub fn new(c: f64, max_iter: usize) -> Self {
        Self {
            c,
            max_iter,
            tol: 1e-4,
            coef: None,
            intercept: 0.0,
            n_iter: 0,
        }
    }

    pub fn coef(&self) -> Option<&Array1<f64>> {
        self.coef.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Quasi-Newton iterations used by the last fit.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(1.0, 1000)
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "Logistic Regression"
    }

    fn fit(&mut self, X: &Array2<f64>, y: &[u8]) -> Result<(), ModelError> {
        let (n, p) = X.dim();
        if n == 0 {
            return Err(ModelError::EmptyDataset);
        }
        if y.len() != n {
            return Err(ModelError::ShapeMismatch {
                expected: n,
                found: y.len(),
            });
        }

        let objective = Objective {
            X,
            y: y.iter().map(|&v| f64::from(v)).collect(),
            alpha: 1.0 / self.c,
        };

        let mut theta = Array1::<f64>::zeros(p + 1);
        let (mut loss, mut grad) = objective.evaluate(&theta);
        let mut history: VecDeque<(Array1<f64>, Array1<f64>, f64)> = VecDeque::new();
        self.n_iter = 0;

        for iter in 0..self.max_iter {
            if max_abs(&grad) <= self.tol {
                break;
            }
            self.n_iter = iter + 1;

            let mut direction = lbfgs_direction(&grad, &history);
            let mut slope = grad.dot(&direction);
            if slope >= 0.0 {
                // Curvature pairs went stale; restart from steepest descent
                history.clear();
                direction = lbfgs_direction(&grad, &history);
                slope = grad.dot(&direction);
            }

            // Backtracking line search with the Armijo condition
            let mut step = 1.0;
            let mut accepted = None;
            for _ in 0..40 {
                let candidate = &theta + &(&direction * step);
                let (candidate_loss, candidate_grad) = objective.evaluate(&candidate);
                if candidate_loss <= loss + 1e-4 * step * slope {
                    accepted = Some((candidate, candidate_loss, candidate_grad));
                    break;
                }
                step *= 0.5;
            }
            let Some((candidate, candidate_loss, candidate_grad)) = accepted else {
                break;
            };

            let s_k = &candidate - &theta;
            let y_k = &candidate_grad - &grad;
            let curvature = s_k.dot(&y_k);
            if curvature > 1e-10 {
                if history.len() == HISTORY {
                    history.pop_front();
                }
                history.push_back((s_k, y_k, 1.0 / curvature));
            }

            let decrease = loss - candidate_loss;
            theta = candidate;
            grad = candidate_grad;
            let scale = loss.abs().max(candidate_loss.abs()).max(1.0);
            loss = candidate_loss;
            if decrease <= FTOL * scale {
                break;
            }
        }

        tracing::debug!(
            iterations = self.n_iter,
            loss,
            features = p,
            "logistic regression fitted"
        );
        self.intercept = theta[p];
        self.coef = Some(theta.slice(s![..p]).to_owned());
        Ok(())
    }

    fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let coef = self.coef.as_ref().ok_or(ModelError::NotFitted)?;
        if X.ncols() != coef.len() {
            return Err(ModelError::ShapeMismatch {
                expected: coef.len(),
                found: X.ncols(),
            });
        }
        Ok((X.dot(coef) + self.intercept).mapv(sigmoid))
    }
}

/// Two-loop recursion: approximate `-H^-1 grad` from the stored pairs.
/// With no history the steepest-descent direction is scaled to unit length.
fn lbfgs_direction(
    grad: &Array1<f64>,
    history: &VecDeque<(Array1<f64>, Array1<f64>, f64)>,
) -> Array1<f64> {
    let mut q = grad.clone();
    let mut alphas = Vec::with_capacity(history.len());
    for (s_k, y_k, rho) in history.iter().rev() {
        let a = rho * s_k.dot(&q);
        q.scaled_add(-a, y_k);
        alphas.push(a);
    }

    let gamma = match history.back() {
        Some((s_k, y_k, _)) => s_k.dot(y_k) / y_k.dot(y_k),
        None => 1.0 / grad.dot(grad).sqrt().max(1.0),
    };
    q *= gamma;

    for ((s_k, y_k, rho), a) in history.iter().zip(alphas.iter().rev()) {
        let beta = rho * y_k.dot(&q);
        q.scaled_add(a - beta, s_k);
    }
    -q
}

fn max_abs(values: &Array1<f64>) -> f64 {
    values.iter().fold(0.0f64, |m, v| m.max(v.abs()))
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
fn log1p_exp(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn separates_a_threshold_problem() {
        let X = Array2::from_shape_vec((8, 1), vec![-3.0, -2.0, -1.5, -1.0, 1.0, 1.5, 2.0, 3.0])
            .unwrap();
        let y = [0, 0, 0, 0, 1, 1, 1, 1];

        let mut model = LogisticRegression::default();
        model.fit(&X, &y).unwrap();

        assert!(model.coef().unwrap()[0] > 0.0);
        assert_eq!(model.predict(&X).unwrap(), y.to_vec());
        assert!(model.n_iter() < 100);
    }

    #[test]
    fn stronger_penalty_shrinks_coefficients() {
        let X = Array2::from_shape_vec((6, 1), vec![-2.0, -1.0, -0.5, 0.5, 1.0, 2.0]).unwrap();
        let y = [0, 0, 1, 0, 1, 1];

        let mut loose = LogisticRegression::new(10.0, 1000);
        let mut tight = LogisticRegression::new(0.01, 1000);
        loose.fit(&X, &y).unwrap();
        tight.fit(&X, &y).unwrap();

        assert!(tight.coef().unwrap()[0].abs() < loose.coef().unwrap()[0].abs());
    }

    #[test]
    fn unfitted_model_cannot_predict() {
        let model = LogisticRegression::default();
        let X = Array2::zeros((1, 1));
        assert!(matches!(model.predict_proba(&X), Err(ModelError::NotFitted)));
    }

    #[test]
    fn gradient_vanishes_at_the_fitted_optimum() {
        let X = Array2::from_shape_vec(
            (8, 2),
            vec![0.5, 1.0, -1.0, 0.2, 1.5, -0.3, -0.7, 0.9, 0.1, -1.2, 2.0, 0.4, -1.5, -0.8, 0.9, 1.1],
        )
        .unwrap();
        let y = [1, 0, 1, 0, 0, 1, 0, 1];

        let mut model = LogisticRegression::default();
        model.fit(&X, &y).unwrap();

        let objective = Objective {
            X: &X,
            y: y.iter().map(|&v| f64::from(v)).collect(),
            alpha: 1.0,
        };
        let mut theta = model.coef().unwrap().to_vec();
        theta.push(model.intercept());
        let (_, grad) = objective.evaluate(&Array1::from(theta));
        assert!(max_abs(&grad) < 1e-3);
    }

    #[test]
    fn handles_more_columns_than_rows() {
        // One-hot identifiers make the design wider than it is tall
        let n = 30;
        let mut X = Array2::zeros((n, n + 1));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            X[[i, i]] = 1.0;
            X[[i, n]] = i as f64 / n as f64 - 0.5;
            y.push(u8::from(i >= n / 2));
        }

        let mut model = LogisticRegression::default();
        model.fit(&X, &y).unwrap();
        assert_eq!(model.coef().unwrap().len(), n + 1);
        assert_eq!(model.predict(&X).unwrap(), y);
    }
}
