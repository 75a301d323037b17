//! Application record validation and feature-vector construction.
//!
//! The vector layout is [`FEATURE_NAMES`]. Both the trainer and the scorer go
//! through [`feature_vector`], so the two sides cannot drift apart.

use crate::domain::{ApplicationRecord, FEATURE_NAMES, FeatureVector};
use crate::error::ScoreError;

/// Upper bound accepted for loan-to-value.
pub const LTV_MAX: f64 = 2.0;
/// Upper bound accepted for debt-to-income.
pub const DTI_MAX: f64 = 5.0;

/// Build the model input in the fixed positional order.
///
/// `state` is not part of the vector.
pub fn feature_vector(record: &ApplicationRecord) -> FeatureVector {
    FeatureVector::new([
        record.income_monthly,
        record.other_debt_monthly,
        record.housing_cost,
        record.principal,
        record.term_months as f64,
        record.ltv,
        record.dti,
    ])
}

/// Check every numeric field against its domain.
///
/// Fields are checked in feature order and the first violation is reported.
pub fn validate(record: &ApplicationRecord) -> Result<(), ScoreError> {
    positive("income_monthly", record.income_monthly)?;
    non_negative("other_debt_monthly", record.other_debt_monthly)?;
    non_negative("housing_cost", record.housing_cost)?;
    positive("principal", record.principal)?;
    if record.term_months <= 0 {
        return Err(ScoreError::validation(
            "term_months",
            format!("must be > 0, got {}", record.term_months),
        ));
    }
    finite("ltv", record.ltv)?;
    if !(record.ltv > 0.0 && record.ltv <= LTV_MAX) {
        return Err(ScoreError::validation(
            "ltv",
            format!("must be in (0, {LTV_MAX}], got {}", record.ltv),
        ));
    }
    finite("dti", record.dti)?;
    if !(0.0..=DTI_MAX).contains(&record.dti) {
        return Err(ScoreError::validation(
            "dti",
            format!("must be in [0, {DTI_MAX}], got {}", record.dti),
        ));
    }
    Ok(())
}

/// Validate, then build the vector.
pub fn checked_feature_vector(record: &ApplicationRecord) -> Result<FeatureVector, ScoreError> {
    validate(record)?;
    Ok(feature_vector(record))
}

/// Feature names as owned strings (artifact metadata).
pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

pub(crate) fn finite(field: &'static str, value: f64) -> Result<(), ScoreError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ScoreError::validation(field, format!("must be finite, got {value}")))
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ScoreError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ScoreError::validation(field, format!("must be > 0, got {value}")))
    }
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), ScoreError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ScoreError::validation(field, format!("must be >= 0, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ApplicationRecord {
        ApplicationRecord {
            income_monthly: 5000.0,
            other_debt_monthly: 400.0,
            housing_cost: 1500.0,
            principal: 25000.0,
            term_months: 60,
            ltv: 0.9,
            dti: 0.35,
            state: "CA".to_string(),
        }
    }

    fn rejected_field(record: &ApplicationRecord) -> &'static str {
        match validate(record) {
            Err(ScoreError::Validation { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn vector_follows_fixed_field_order() {
        let v = feature_vector(&record());
        assert_eq!(
            v.to_array(),
            [5000.0, 400.0, 1500.0, 25000.0, 60.0, 0.9, 0.35]
        );
    }

    #[test]
    fn vector_positions_match_feature_names() {
        // Distinct values per field so any swapped position shows up.
        let r = ApplicationRecord {
            income_monthly: 1.0,
            other_debt_monthly: 2.0,
            housing_cost: 3.0,
            principal: 4.0,
            term_months: 5,
            ltv: 0.6,
            dti: 0.7,
            state: "NY".to_string(),
        };
        let v = feature_vector(&r);
        let by_name: Vec<(&str, f64)> = FEATURE_NAMES.iter().copied().zip(v.to_array()).collect();
        assert_eq!(
            by_name,
            vec![
                ("income_monthly", 1.0),
                ("other_debt_monthly", 2.0),
                ("housing_cost", 3.0),
                ("principal", 4.0),
                ("term_months", 5.0),
                ("ltv", 0.6),
                ("dti", 0.7),
            ]
        );
    }

    #[test]
    fn state_does_not_enter_the_vector() {
        let mut other = record();
        other.state = "TX".to_string();
        assert_eq!(feature_vector(&record()), feature_vector(&other));
    }

    #[test]
    fn accepts_a_typical_record() {
        assert!(validate(&record()).is_ok());
    }

    #[test]
    fn rejects_zero_income() {
        let mut r = record();
        r.income_monthly = 0.0;
        assert_eq!(rejected_field(&r), "income_monthly");
    }

    #[test]
    fn rejects_negative_term() {
        let mut r = record();
        r.term_months = -1;
        assert_eq!(rejected_field(&r), "term_months");
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let cases: [(fn(&mut ApplicationRecord), &str); 10] = [
            (|r| r.other_debt_monthly = -1.0, "other_debt_monthly"),
            (|r| r.housing_cost = -0.01, "housing_cost"),
            (|r| r.principal = 0.0, "principal"),
            (|r| r.term_months = 0, "term_months"),
            (|r| r.ltv = 0.0, "ltv"),
            (|r| r.ltv = 2.5, "ltv"),
            (|r| r.dti = -0.1, "dti"),
            (|r| r.dti = 5.5, "dti"),
            (|r| r.income_monthly = f64::NAN, "income_monthly"),
            (|r| r.principal = f64::INFINITY, "principal"),
        ];
        for (mutate, field) in cases {
            let mut r = record();
            mutate(&mut r);
            assert_eq!(rejected_field(&r), field);
        }
    }

    #[test]
    fn range_edges_are_inclusive_where_documented() {
        let mut r = record();
        r.ltv = LTV_MAX;
        r.dti = 0.0;
        r.other_debt_monthly = 0.0;
        r.housing_cost = 0.0;
        assert!(validate(&r).is_ok());
        r.dti = DTI_MAX;
        assert!(validate(&r).is_ok());
    }

    #[test]
    fn first_violation_is_reported() {
        let mut r = record();
        r.income_monthly = -5.0;
        r.dti = 9.0;
        assert_eq!(rejected_field(&r), "income_monthly");
    }
}
