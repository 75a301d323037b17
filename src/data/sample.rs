//! Synthetic applicant generation.
//!
//! Each raw attribute is drawn from a clipped normal; `ltv` and `dti` are
//! derived from the drawn values. The default label is a Bernoulli draw from a
//! ground-truth logit that depends only on `ltv` and `dti`, so the other five
//! features are noise the classifier has to learn to ignore.
//!
//! Columns are drawn one attribute at a time (all incomes, then all debts, ...)
//! from a single seeded RNG, so a seed fully determines the dataset.
//!
//! The RNG is `ChaCha8Rng`, whose output stream is value-stable across
//! releases; tests pin the seed-42 dataset.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Bernoulli, Normal};

use crate::domain::{ApplicationRecord, LabeledApplicant, TrainConfig};
use crate::error::TrainError;
use crate::math::{monthly_payment, sigmoid};
use crate::scoring::features::feature_vector;

/// Annual rate used to synthesize the monthly payment behind `dti`.
pub const SYNTHETIC_APR: f64 = 0.08;

/// Loan terms offered, drawn uniformly.
pub const TERM_CHOICES: [i64; 5] = [36, 48, 60, 72, 84];

// Ground-truth default logit:
// -3.2 + 2.8 (ltv - 0.9) + 3.5 (dti - 0.35) + N(0, 0.6)
const LOGIT_INTERCEPT: f64 = -3.2;
const LOGIT_LTV: f64 = 2.8;
const LOGIT_DTI: f64 = 3.5;
const LTV_PIVOT: f64 = 0.9;
const DTI_PIVOT: f64 = 0.35;
const LOGIT_NOISE_SD: f64 = 0.6;

/// Equity cushion added to the principal to form the collateral value.
const EQUITY_MEAN: f64 = 3000.0;
const EQUITY_SD: f64 = 3000.0;
/// Collateral value floor.
const MIN_COLLATERAL: f64 = 8000.0;
const LTV_BOUNDS: (f64, f64) = (0.5, 1.3);

/// A normal distribution whose draws are clamped into `[lo, hi]`.
#[derive(Debug, Clone)]
struct ClippedNormal {
    dist: Normal<f64>,
    lo: f64,
    hi: f64,
}

impl ClippedNormal {
    fn new(name: &str, mean: f64, sd: f64, lo: f64, hi: f64) -> Result<Self, TrainError> {
        let dist = Normal::new(mean, sd)
            .map_err(|e| TrainError::Sample(format!("{name} distribution: {e}")))?;
        Ok(Self { dist, lo, hi })
    }

    fn draw(&self, rng: &mut ChaCha8Rng, n: usize) -> Vec<f64> {
        (0..n)
            .map(|_| self.dist.sample(&mut *rng).clamp(self.lo, self.hi))
            .collect()
    }
}

/// A generated dataset plus summary statistics.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    pub applicants: Vec<LabeledApplicant>,
    pub stats: DatasetStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n: usize,
    pub n_default: usize,
    pub mean_ltv: f64,
    pub mean_dti: f64,
    /// Mean of the ground-truth probabilities the labels were drawn from.
    pub mean_true_pd: f64,
}

impl DatasetStats {
    pub fn default_rate(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.n_default as f64 / self.n as f64
        }
    }
}

pub fn generate_dataset(config: &TrainConfig) -> Result<SyntheticDataset, TrainError> {
    let n = config.sample_count;
    if n == 0 {
        return Err(TrainError::Config("sample count must be > 0".into()));
    }

    let income = ClippedNormal::new("income", 5000.0, 1500.0, 1500.0, 15000.0)?;
    let other_debt = ClippedNormal::new("other_debt", 400.0, 300.0, 0.0, 2500.0)?;
    let housing = ClippedNormal::new("housing", 1500.0, 600.0, 0.0, 4000.0)?;
    let principal = ClippedNormal::new("principal", 25000.0, 8000.0, 5000.0, 60000.0)?;
    let equity = Normal::new(EQUITY_MEAN, EQUITY_SD)
        .map_err(|e| TrainError::Sample(format!("equity distribution: {e}")))?;
    let noise = Normal::new(0.0, LOGIT_NOISE_SD)
        .map_err(|e| TrainError::Sample(format!("logit noise distribution: {e}")))?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let income = income.draw(&mut rng, n);
    let other_debt = other_debt.draw(&mut rng, n);
    let housing = housing.draw(&mut rng, n);
    let principal = principal.draw(&mut rng, n);
    let term: Vec<i64> = (0..n)
        .map(|_| TERM_CHOICES[rng.gen_range(0..TERM_CHOICES.len())])
        .collect();
    let ltv: Vec<f64> = principal
        .iter()
        .map(|&p| {
            let collateral = (p + equity.sample(&mut rng)).max(MIN_COLLATERAL);
            (p / collateral).clamp(LTV_BOUNDS.0, LTV_BOUNDS.1)
        })
        .collect();

    let mut applicants = Vec::with_capacity(n);
    for i in 0..n {
        let payment = monthly_payment(principal[i], SYNTHETIC_APR, term[i] as f64);
        let dti = (other_debt[i] + housing[i] + payment) / income[i];

        let logit = LOGIT_INTERCEPT
            + LOGIT_LTV * (ltv[i] - LTV_PIVOT)
            + LOGIT_DTI * (dti - DTI_PIVOT)
            + noise.sample(&mut rng);
        let true_pd = sigmoid(logit);
        let default = Bernoulli::new(true_pd)
            .map_err(|e| TrainError::Sample(format!("label draw for row {i}: {e}")))?
            .sample(&mut rng);

        let record = ApplicationRecord {
            income_monthly: income[i],
            other_debt_monthly: other_debt[i],
            housing_cost: housing[i],
            principal: principal[i],
            term_months: term[i],
            ltv: ltv[i],
            dti,
            state: String::new(),
        };
        let features = feature_vector(&record);
        if features.as_slice().iter().any(|v| !v.is_finite()) {
            return Err(TrainError::Sample(format!("row {i} produced non-finite features")));
        }

        applicants.push(LabeledApplicant {
            record,
            features,
            true_pd,
            default,
        });
    }

    let stats = compute_stats(&applicants);
    Ok(SyntheticDataset { applicants, stats })
}

fn compute_stats(applicants: &[LabeledApplicant]) -> DatasetStats {
    let n = applicants.len();
    let denom = n.max(1) as f64;
    let mut n_default = 0;
    let mut sum_ltv = 0.0;
    let mut sum_dti = 0.0;
    let mut sum_pd = 0.0;
    for a in applicants {
        if a.default {
            n_default += 1;
        }
        sum_ltv += a.record.ltv;
        sum_dti += a.record.dti;
        sum_pd += a.true_pd;
    }
    DatasetStats {
        n,
        n_default,
        mean_ltv: sum_ltv / denom,
        mean_dti: sum_dti / denom,
        mean_true_pd: sum_pd / denom,
    }
}
