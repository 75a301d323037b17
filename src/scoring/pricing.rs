//! Probability-to-price mapping and response rounding.

/// APR floor charged to every borrower.
pub const BASE_RATE: f64 = 0.05;
/// APR added per unit of default probability.
pub const RISK_SPREAD: f64 = 0.15;

/// Decimal places kept in scoring responses.
pub const RESPONSE_DECIMALS: i32 = 4;

/// Linear risk-based price: `BASE_RATE + pd * RISK_SPREAD`.
pub fn recommended_apr(pd: f64) -> f64 {
    BASE_RATE + pd * RISK_SPREAD
}

/// Round to [`RESPONSE_DECIMALS`] places, halves away from zero.
pub fn round_response(x: f64) -> f64 {
    let factor = 10f64.powi(RESPONSE_DECIMALS);
    (x * factor).round() / factor
}
