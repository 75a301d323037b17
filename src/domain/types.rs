//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - deserialized straight from HTTP request bodies
//! - passed between the trainer, the artifact writer and the scorer
//! - exported to JSON/CSV

use std::path::PathBuf;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 7;

/// Model inputs in positional order.
///
/// The fitted coefficients are bound to these positions. The trainer writes this
/// list into the artifact and the scorer refuses an artifact that disagrees.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "income_monthly",
    "other_debt_monthly",
    "housing_cost",
    "principal",
    "term_months",
    "ltv",
    "dti",
];

/// One loan applicant at scoring time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub income_monthly: f64,
    pub other_debt_monthly: f64,
    pub housing_cost: f64,
    pub principal: f64,
    /// Signed so that negative terms reach range validation instead of failing to parse.
    /// Whole-number floats such as `60.0` are accepted; `60.5` is not.
    #[serde(deserialize_with = "whole_number")]
    pub term_months: i64,
    pub ltv: f64,
    pub dti: f64,
    /// Jurisdiction code. Accepted and carried, never fed to the model.
    pub state: String,
}

/// A vehicle loan request for rule-based evaluation (no model involved).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub vehicle_price: f64,
    pub down_payment: f64,
    #[serde(default)]
    pub trade_in: f64,
    #[serde(default)]
    pub fees: f64,
    /// Percent in `[0, 100]`. Validated, not used in pricing.
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(deserialize_with = "whole_number")]
    pub term_months: i64,
    /// Two-letter code; surrounding whitespace and case are normalized.
    pub state: String,
    pub income_monthly: f64,
    pub other_debt_monthly: f64,
    #[serde(default)]
    pub housing_cost: f64,
}

/// One lender's offer for an approved request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LenderOffer {
    pub lender: String,
    /// Annual rate in percent, rounded to 2 decimals.
    pub apr: f64,
    /// Level monthly payment, rounded to whole currency units.
    pub monthly: i64,
    pub term_months: i64,
    pub principal: f64,
    pub notes: String,
}

/// Outcome of evaluating a [`LoanRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanEvaluation {
    pub approved: bool,
    pub ltv: f64,
    pub dti: f64,
    pub principal: f64,
    /// Empty unless approved.
    pub offers: Vec<LenderOffer>,
}

/// Ordered model input derived from an [`ApplicationRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_array(self) -> [f64; FEATURE_COUNT] {
        self.0
    }
}

/// Scoring output returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Probability of default, rounded to 4 decimals.
    pub pd: f64,
    /// `BASE_RATE + pd * RISK_SPREAD`, rounded to 4 decimals.
    pub recommended_apr: f64,
    pub model_version: String,
}

/// Load state of the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    pub version: String,
}

/// A synthetic applicant with its sampled outcome.
#[derive(Debug, Clone)]
pub struct LabeledApplicant {
    pub record: ApplicationRecord,
    pub features: FeatureVector,
    /// Ground-truth default probability the label was drawn from.
    pub true_pd: f64,
    pub default: bool,
}

/// In-sample diagnostics of a fitted pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub log_loss: f64,
    /// Accuracy of thresholding the predicted pd at 0.5.
    pub accuracy: f64,
    /// ROC AUC; `None` when only one class is present.
    pub auc: Option<f64>,
    /// Observed share of defaults in the training set.
    pub default_rate: f64,
}

/// A full training run's configuration.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub seed: u64,
    pub sample_count: usize,
    /// Upper bound on Newton iterations.
    pub max_iter: usize,
    /// Inverse L2 regularization strength (larger = weaker penalty).
    pub l2_c: f64,
    /// Convergence threshold on the gradient's infinity norm, per row.
    pub tolerance: f64,
    pub out_dir: PathBuf,
    pub model_version: String,
    pub export_data: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            sample_count: 4000,
            max_iter: 200,
            l2_c: 1.0,
            tolerance: 1e-8,
            out_dir: PathBuf::from("."),
            model_version: "1.0.0".to_string(),
            export_data: None,
        }
    }
}

/// Scoring server configuration.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub bind: String,
    pub model_dir: PathBuf,
}

/// Deserialize an integer that may arrive as a JSON float with no fractional part.
pub fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(n) => Ok(n),
        // 2^63 is exactly representable, so `<` keeps the cast in range.
        Number::Float(x) if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 => {
            Ok(x as i64)
        }
        Number::Float(x) => Err(D::Error::custom(format!("expected a whole number, got {x}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_with_term(term: serde_json::Value) -> serde_json::Result<ApplicationRecord> {
        serde_json::from_value(json!({
            "income_monthly": 5000.0,
            "other_debt_monthly": 400.0,
            "housing_cost": 1500.0,
            "principal": 25000.0,
            "term_months": term,
            "ltv": 0.9,
            "dti": 0.35,
            "state": "CA"
        }))
    }

    #[test]
    fn term_accepts_integers_and_whole_floats() {
        assert_eq!(record_with_term(json!(60)).unwrap().term_months, 60);
        assert_eq!(record_with_term(json!(60.0)).unwrap().term_months, 60);
        assert_eq!(record_with_term(json!(-12)).unwrap().term_months, -12);
    }

    #[test]
    fn term_rejects_fractions_and_non_numbers() {
        assert!(record_with_term(json!(60.5)).is_err());
        assert!(record_with_term(json!(1e300)).is_err());
        assert!(record_with_term(json!("60")).is_err());
    }

    #[test]
    fn term_serializes_as_an_integer() {
        let r = record_with_term(json!(72.0)).unwrap();
        assert_eq!(serde_json::to_value(&r).unwrap()["term_months"], json!(72));
    }
}
