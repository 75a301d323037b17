//! Logistic link and the binary log-loss.
//!
//! Numerical notes:
//! - `sigmoid` branches on the sign of `z` so `exp` only ever sees a
//!   non-positive argument and cannot overflow.
//! - `log1p_exp(z) = ln(1 + e^z)` is the per-row negative log-likelihood
//!   building block; it is computed without forming `e^z` for large `z`.

/// Logistic function `1 / (1 + e^-z)`.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
pub fn log1p_exp(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

/// Negative log-likelihood of label `y` under logit `z`.
///
/// `-[y ln σ(z) + (1-y) ln(1-σ(z))] = ln(1 + e^z) - y z`
pub fn nll(z: f64, y: bool) -> f64 {
    log1p_exp(z) - if y { z } else { 0.0 }
}
