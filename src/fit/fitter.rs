//! L2-penalized logistic regression by Newton's method (IRLS).
//!
//! Given standardized rows `x_i` (with a leading 1 for the intercept) and
//! binary labels `y_i`, we minimize
//!
//! ```text
//! f(β) = Σ_i [ ln(1 + e^{x_i·β}) - y_i x_i·β ] + (λ/2) Σ_{j≥1} β_j²,   λ = 1/C
//! ```
//!
//! The intercept is not penalized. Each iteration:
//! - computes `μ_i = σ(x_i·β)` for every row (parallel)
//! - forms the gradient `g = Xᵀ(μ - y) + λβ̃`
//! - forms the Hessian `H = X_wᵀ X_w + λI'` where `X_w` has each row scaled by
//!   `sqrt(μ_i (1 - μ_i))`
//! - solves `H Δ = g` and steps `β ← β - tΔ` with a backtracking line search
//!
//! The objective is strictly convex for `λ > 0`, so this converges to the
//! unique minimizer in a handful of iterations.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{FEATURE_COUNT, LabeledApplicant, TrainConfig};
use crate::error::TrainError;
use crate::math::{nll, sigmoid, solve_spd};
use crate::models::{LogisticClassifier, NEGATIVE_CLASS, POSITIVE_CLASS, Pipeline, StandardScaler};

/// Coefficients plus the intercept.
const PARAM_COUNT: usize = FEATURE_COUNT + 1;

/// Armijo sufficient-decrease constant.
const ARMIJO_C: f64 = 1e-4;
const MAX_HALVINGS: usize = 40;

/// Options that control a single fit.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Newton iteration cap.
    pub max_iter: usize,
    /// Inverse regularization strength `C`; the penalty is `1/(2C) ||w||²`.
    pub l2_c: f64,
    /// Convergence threshold on the per-row gradient (`||g||∞ / n`).
    pub tolerance: f64,
}

impl FitOptions {
    pub fn from_config(config: &TrainConfig) -> Self {
        Self {
            max_iter: config.max_iter,
            l2_c: config.l2_c,
            tolerance: config.tolerance,
        }
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::from_config(&TrainConfig::default())
    }
}

/// How the optimizer finished.
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub iterations: usize,
    pub converged: bool,
    /// Final `||g||∞ / n`.
    pub grad_norm: f64,
    /// Final penalized objective `f(β)`.
    pub objective: f64,
}

/// Fit the scaler and classifier on labeled applicants.
pub fn fit_pipeline(
    applicants: &[LabeledApplicant],
    opts: &FitOptions,
) -> Result<(Pipeline, FitReport), TrainError> {
    validate_options(opts)?;
    if applicants.is_empty() {
        return Err(TrainError::Fit("no training rows".into()));
    }
    let n_pos = applicants.iter().filter(|a| a.default).count();
    if n_pos == 0 || n_pos == applicants.len() {
        return Err(TrainError::Fit(format!(
            "training labels contain a single class ({n_pos} of {} positive)",
            applicants.len()
        )));
    }
    if let Some(i) = applicants
        .iter()
        .position(|a| a.features.as_slice().iter().any(|v| !v.is_finite()))
    {
        return Err(TrainError::Fit(format!("row {i} has non-finite features")));
    }

    let rows: Vec<_> = applicants.iter().map(|a| a.features).collect();
    let scaler = StandardScaler::fit(&rows)
        .ok_or_else(|| TrainError::Fit("cannot standardize an empty design".into()))?;

    let design: Vec<[f64; PARAM_COUNT]> = rows
        .par_iter()
        .map(|row| {
            let z = scaler.transform(row);
            let mut x = [1.0; PARAM_COUNT];
            x[1..].copy_from_slice(&z);
            x
        })
        .collect();
    let labels: Vec<bool> = applicants.iter().map(|a| a.default).collect();

    let (beta, report) = newton(&design, &labels, opts)?;

    let classifier = LogisticClassifier {
        classes: vec![NEGATIVE_CLASS, POSITIVE_CLASS],
        coefficients: beta.iter().skip(1).copied().collect(),
        intercept: beta[0],
        l2_c: opts.l2_c,
        iterations: report.iterations,
        converged: report.converged,
    };

    Ok((Pipeline { scaler, classifier }, report))
}

fn validate_options(opts: &FitOptions) -> Result<(), TrainError> {
    if !(opts.l2_c.is_finite() && opts.l2_c > 0.0) {
        return Err(TrainError::Config(format!(
            "regularization C must be finite and > 0 (got {})",
            opts.l2_c
        )));
    }
    if opts.max_iter == 0 {
        return Err(TrainError::Config("max_iter must be > 0".into()));
    }
    if !(opts.tolerance.is_finite() && opts.tolerance > 0.0) {
        return Err(TrainError::Config(format!(
            "tolerance must be finite and > 0 (got {})",
            opts.tolerance
        )));
    }
    Ok(())
}

fn newton(
    x: &[[f64; PARAM_COUNT]],
    y: &[bool],
    opts: &FitOptions,
) -> Result<(DVector<f64>, FitReport), TrainError> {
    let n = x.len();
    let lambda = 1.0 / opts.l2_c;
    let mut beta = DVector::<f64>::zeros(PARAM_COUNT);
    let mut f = objective(x, y, &beta, lambda);

    let mut iterations = 0;
    let mut converged = false;
    let mut grad_norm = f64::INFINITY;

    while iterations < opts.max_iter {
        let mu = probabilities(x, &beta);
        let g = gradient(x, y, &mu, &beta, lambda);
        grad_norm = g.amax() / n as f64;
        if grad_norm <= opts.tolerance {
            converged = true;
            break;
        }

        let h = hessian(x, &mu, lambda);
        let delta = solve_spd(&h, &g)
            .ok_or_else(|| TrainError::Fit(format!("singular Hessian at iteration {iterations}")))?;
        iterations += 1;

        let slope = g.dot(&delta);
        let mut t = 1.0;
        let mut accepted = None;
        for _ in 0..MAX_HALVINGS {
            let candidate = &beta - &delta * t;
            let f_new = objective(x, y, &candidate, lambda);
            let flat = (f_new - f).abs() <= 1e-12 * (1.0 + f.abs());
            if f_new.is_finite() && (f_new <= f - ARMIJO_C * t * slope || flat) {
                accepted = Some((candidate, f_new));
                break;
            }
            t *= 0.5;
        }

        let Some((next, f_next)) = accepted else {
            debug!(iterations, grad_norm, "line search stalled");
            break;
        };
        let step = (&next - &beta).amax();
        beta = next;
        f = f_next;
        debug!(iteration = iterations, objective = f, step, "newton step");

        if step <= opts.tolerance {
            let mu = probabilities(x, &beta);
            grad_norm = gradient(x, y, &mu, &beta, lambda).amax() / n as f64;
            converged = true;
            break;
        }
    }

    if !f.is_finite() || beta.iter().any(|v| !v.is_finite()) {
        return Err(TrainError::Fit("optimizer produced non-finite coefficients".into()));
    }
    if !converged {
        warn!(
            iterations,
            max_iter = opts.max_iter,
            grad_norm,
            "logistic fit did not converge"
        );
    }

    Ok((
        beta,
        FitReport {
            iterations,
            converged,
            grad_norm,
            objective: f,
        },
    ))
}

fn logit(x: &[f64; PARAM_COUNT], beta: &DVector<f64>) -> f64 {
    x.iter().zip(beta.iter()).map(|(a, b)| a * b).sum()
}

fn probabilities(x: &[[f64; PARAM_COUNT]], beta: &DVector<f64>) -> Vec<f64> {
    x.par_iter().map(|row| sigmoid(logit(row, beta))).collect()
}

fn penalty(beta: &DVector<f64>, lambda: f64) -> f64 {
    0.5 * lambda * beta.iter().skip(1).map(|b| b * b).sum::<f64>()
}

fn objective(x: &[[f64; PARAM_COUNT]], y: &[bool], beta: &DVector<f64>, lambda: f64) -> f64 {
    // Collect, then sum in row order: a parallel float reduction is not
    // reproducible run to run.
    let losses: Vec<f64> = x
        .par_iter()
        .zip(y.par_iter())
        .map(|(row, &label)| nll(logit(row, beta), label))
        .collect();
    losses.iter().sum::<f64>() + penalty(beta, lambda)
}

fn gradient(
    x: &[[f64; PARAM_COUNT]],
    y: &[bool],
    mu: &[f64],
    beta: &DVector<f64>,
    lambda: f64,
) -> DVector<f64> {
    let mut g = DVector::<f64>::zeros(PARAM_COUNT);
    for ((row, &label), &m) in x.iter().zip(y).zip(mu) {
        let r = m - if label { 1.0 } else { 0.0 };
        for j in 0..PARAM_COUNT {
            g[j] += row[j] * r;
        }
    }
    for j in 1..PARAM_COUNT {
        g[j] += lambda * beta[j];
    }
    g
}

fn hessian(x: &[[f64; PARAM_COUNT]], mu: &[f64], lambda: f64) -> DMatrix<f64> {
    let n = x.len();
    let mut xw = DMatrix::<f64>::zeros(n, PARAM_COUNT);
    for (i, (row, &m)) in x.iter().zip(mu).enumerate() {
        let sw = (m * (1.0 - m)).sqrt();
        for j in 0..PARAM_COUNT {
            xw[(i, j)] = row[j] * sw;
        }
    }
    let mut h = xw.transpose() * &xw;
    for j in 1..PARAM_COUNT {
        h[(j, j)] += lambda;
    }
    h
}
