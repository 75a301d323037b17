//! Small dense linear solves.
//!
//! Each Newton step of the logistic fit solves `H Δ = g` where `H` is the
//! (penalized) Hessian of the log-likelihood: symmetric, 8x8, and positive
//! definite whenever the design has full column rank.
//!
//! Implementation choices:
//! - Cholesky first, since `H` is SPD in every non-degenerate case.
//! - SVD with progressively looser tolerances as a fallback when Cholesky
//!   rejects a near-singular `H` (e.g. a constant feature column).

use nalgebra::{DMatrix, DVector};

/// Solve a symmetric positive definite system `a x = b`.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_spd(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if let Some(chol) = a.clone().cholesky() {
        let x = chol.solve(b);
        if x.iter().all(|v| v.is_finite()) {
            return Some(x);
        }
    }

    let svd = a.clone().svd(true, true);
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}
