//! APR tiers and per-lender offers.

use crate::domain::LenderOffer;
use crate::error::ScoreError;
use crate::math::monthly_payment;

/// No offer is priced below this APR (percent).
pub const APR_FLOOR: f64 = 3.99;
/// Base APR (percent) when no tier matches.
pub const FALLBACK_APR: f64 = 9.99;

/// A base-rate band: both ratios must be strictly below the caps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AprTier {
    pub max_ltv: f64,
    pub max_dti: f64,
    pub apr: f64,
}

/// Checked in order; the first matching tier wins.
pub const APR_TIERS: [AprTier; 3] = [
    AprTier {
        max_ltv: 0.90,
        max_dti: 0.35,
        apr: 5.99,
    },
    AprTier {
        max_ltv: 1.00,
        max_dti: 0.40,
        apr: 6.99,
    },
    AprTier {
        max_ltv: 1.10,
        max_dti: 0.45,
        apr: 7.99,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lender {
    pub name: &'static str,
    /// Added to the base APR (percentage points).
    pub spread: f64,
    pub notes: &'static str,
}

pub const LENDERS: [Lender; 3] = [
    Lender {
        name: "FastAuto Finance",
        spread: 0.0,
        notes: "Same-day decision",
    },
    Lender {
        name: "Roadster Bank",
        spread: 0.5,
        notes: "Rate lock 30 days",
    },
    Lender {
        name: "Highway Credit Union",
        spread: 1.0,
        notes: "No prepayment penalty",
    },
];

/// Base APR in percent for the given ratios.
pub fn base_apr(ltv: f64, dti: f64) -> f64 {
    APR_TIERS
        .iter()
        .find(|t| ltv < t.max_ltv && dti < t.max_dti)
        .map_or(FALLBACK_APR, |t| t.apr)
}

/// One offer per lender, in panel order.
///
/// The payment is amortized at the unrounded APR; the reported APR is then
/// rounded to 2 decimals and the payment to whole units.
pub fn build_offers(
    principal: f64,
    term_months: i64,
    ltv: f64,
    dti: f64,
) -> Result<Vec<LenderOffer>, ScoreError> {
    let base = base_apr(ltv, dti);

    LENDERS
        .iter()
        .map(|lender| {
            let apr = (base + lender.spread).max(APR_FLOOR);
            let payment = monthly_payment(principal, apr / 100.0, term_months as f64);
            if !payment.is_finite() {
                return Err(ScoreError::Evaluation(format!(
                    "monthly payment for {} is not finite",
                    lender.name
                )));
            }
            Ok(LenderOffer {
                lender: lender.name.to_string(),
                apr: round_to(apr, 2),
                monthly: payment.round() as i64,
                term_months,
                principal,
                notes: lender.notes.to_string(),
            })
        })
        .collect()
}

fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}
