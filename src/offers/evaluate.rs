//! Loan request validation, derived ratios and the approval decision.
//!
//! `principal = vehicle_price - down_payment - trade_in + fees`
//! `ltv = principal / vehicle_price`
//! `dti = (other_debt_monthly + housing_cost) / income_monthly`
//!
//! A request is approved when `ltv < 1.2` and `dti < 0.5`; only approved
//! requests receive offers.

use tracing::debug;

use crate::domain::{LoanEvaluation, LoanRequest};
use crate::error::ScoreError;
use crate::offers::lenders::build_offers;
use crate::scoring::features::{finite, non_negative, positive};

/// Loan-to-value must be strictly below this to approve.
pub const APPROVAL_MAX_LTV: f64 = 1.2;
/// Debt-to-income must be strictly below this to approve.
pub const APPROVAL_MAX_DTI: f64 = 0.5;

/// Largest accepted tax rate, in percent.
pub const TAX_RATE_MAX: f64 = 100.0;

/// Validate `request` and return its normalized state code.
///
/// Fields are checked in declaration order and the first violation is reported.
pub fn validate_request(request: &LoanRequest) -> Result<String, ScoreError> {
    positive("vehicle_price", request.vehicle_price)?;
    non_negative("down_payment", request.down_payment)?;
    non_negative("trade_in", request.trade_in)?;
    non_negative("fees", request.fees)?;
    finite("tax_rate", request.tax_rate)?;
    if !(0.0..=TAX_RATE_MAX).contains(&request.tax_rate) {
        return Err(ScoreError::validation(
            "tax_rate",
            format!("must be in [0, {TAX_RATE_MAX}], got {}", request.tax_rate),
        ));
    }
    if request.term_months <= 0 {
        return Err(ScoreError::validation(
            "term_months",
            format!("must be > 0, got {}", request.term_months),
        ));
    }
    let state = normalize_state(&request.state)?;
    positive("income_monthly", request.income_monthly)?;
    non_negative("other_debt_monthly", request.other_debt_monthly)?;
    non_negative("housing_cost", request.housing_cost)?;
    Ok(state)
}

/// Trim and upper-case a state code, which must then be two characters.
pub fn normalize_state(raw: &str) -> Result<String, ScoreError> {
    let state = raw.trim().to_uppercase();
    if state.chars().count() != 2 {
        return Err(ScoreError::validation(
            "state",
            format!("must be a 2-letter code, got {raw:?}"),
        ));
    }
    Ok(state)
}

pub fn is_approved(ltv: f64, dti: f64) -> bool {
    ltv < APPROVAL_MAX_LTV && dti < APPROVAL_MAX_DTI
}

/// Evaluate one loan request.
pub fn evaluate_loan(request: &LoanRequest) -> Result<LoanEvaluation, ScoreError> {
    let state = validate_request(request)?;

    let principal = request.vehicle_price - request.down_payment - request.trade_in + request.fees;
    if !(principal.is_finite() && principal > 0.0) {
        return Err(ScoreError::validation(
            "principal",
            format!("vehicle_price - down_payment - trade_in + fees must be > 0, got {principal}"),
        ));
    }

    let ltv = principal / request.vehicle_price;
    let dti = (request.other_debt_monthly + request.housing_cost) / request.income_monthly;
    if !(ltv.is_finite() && dti.is_finite()) {
        return Err(ScoreError::Evaluation(format!(
            "derived ratios are not finite (ltv {ltv}, dti {dti})"
        )));
    }

    let approved = is_approved(ltv, dti);
    let offers = if approved {
        build_offers(principal, request.term_months, ltv, dti)?
    } else {
        Vec::new()
    };

    debug!(%state, approved, ltv, dti, principal, offers = offers.len(), "loan evaluated");
    Ok(LoanEvaluation {
        approved,
        ltv,
        dti,
        principal,
        offers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> LoanRequest {
        LoanRequest {
            vehicle_price: 30_000.0,
            down_payment: 3_000.0,
            trade_in: 0.0,
            fees: 0.0,
            tax_rate: 0.0,
            term_months: 60,
            state: "ca".to_string(),
            income_monthly: 6_000.0,
            other_debt_monthly: 300.0,
            housing_cost: 1_500.0,
        }
    }

    fn rejected_field(request: &LoanRequest) -> &'static str {
        match evaluate_loan(request) {
            Err(ScoreError::Validation { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn derives_principal_and_ratios() {
        let mut r = request();
        r.trade_in = 2_000.0;
        r.fees = 500.0;
        let out = evaluate_loan(&r).unwrap();
        assert_eq!(out.principal, 25_500.0);
        assert_eq!(out.ltv, 25_500.0 / 30_000.0);
        assert_eq!(out.dti, 0.3);
    }

    #[test]
    fn approved_request_gets_three_offers() {
        // ltv is exactly 0.9, so the second tier applies.
        let out = evaluate_loan(&request()).unwrap();
        assert!(out.approved);
        assert_eq!(out.ltv, 0.9);
        let summary: Vec<(f64, i64)> = out.offers.iter().map(|o| (o.apr, o.monthly)).collect();
        assert_eq!(summary, vec![(6.99, 535), (7.49, 541), (7.99, 547)]);
        assert!(out.offers.iter().all(|o| o.principal == 27_000.0));
    }

    #[test]
    fn approval_gate_is_strict_on_both_ratios() {
        assert!(is_approved(1.19, 0.49));
        assert!(!is_approved(1.2, 0.1));
        assert!(!is_approved(0.5, 0.5));
    }

    #[test]
    fn ltv_at_the_cap_is_declined_without_offers() {
        // 12_000 / 10_000 == 1.2
        let mut r = request();
        r.vehicle_price = 10_000.0;
        r.down_payment = 0.0;
        r.fees = 2_000.0;
        let out = evaluate_loan(&r).unwrap();
        assert_eq!(out.ltv, 1.2);
        assert!(!out.approved);
        assert!(out.offers.is_empty());
    }

    #[test]
    fn dti_at_the_cap_is_declined() {
        // (1_000 + 2_000) / 6_000 == 0.5
        let mut r = request();
        r.other_debt_monthly = 1_000.0;
        r.housing_cost = 2_000.0;
        let out = evaluate_loan(&r).unwrap();
        assert_eq!(out.dti, 0.5);
        assert!(!out.approved);
        assert!(out.offers.is_empty());

        r.housing_cost = 1_990.0;
        assert!(evaluate_loan(&r).unwrap().approved);
    }

    #[test]
    fn state_is_trimmed_and_upper_cased() {
        assert_eq!(normalize_state(" ca ").unwrap(), "CA");
        assert_eq!(validate_request(&request()).unwrap(), "CA");
        for bad in ["", "C", "CAL", "   "] {
            assert!(normalize_state(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let cases: [(fn(&mut LoanRequest), &str); 9] = [
            (|r| r.vehicle_price = 0.0, "vehicle_price"),
            (|r| r.down_payment = -1.0, "down_payment"),
            (|r| r.trade_in = -1.0, "trade_in"),
            (|r| r.fees = f64::NAN, "fees"),
            (|r| r.tax_rate = 100.5, "tax_rate"),
            (|r| r.term_months = 0, "term_months"),
            (|r| r.state = "Texas".to_string(), "state"),
            (|r| r.income_monthly = 0.0, "income_monthly"),
            (|r| r.housing_cost = -5.0, "housing_cost"),
        ];
        for (mutate, field) in cases {
            let mut r = request();
            mutate(&mut r);
            assert_eq!(rejected_field(&r), field);
        }
    }

    #[test]
    fn non_positive_principal_is_rejected() {
        let mut r = request();
        r.down_payment = 30_000.0;
        assert_eq!(rejected_field(&r), "principal");
    }

    #[test]
    fn non_finite_ratio_is_an_evaluation_error() {
        let mut r = request();
        r.income_monthly = 1e-320;
        assert!(matches!(evaluate_loan(&r), Err(ScoreError::Evaluation(_))));
    }

    #[test]
    fn optional_fields_default_to_zero() {
        let r: LoanRequest = serde_json::from_value(json!({
            "vehicle_price": 30000,
            "down_payment": 3000,
            "term_months": 60.0,
            "state": "ny",
            "income_monthly": 6000,
            "other_debt_monthly": 300
        }))
        .unwrap();
        assert_eq!(r.trade_in, 0.0);
        assert_eq!(r.fees, 0.0);
        assert_eq!(r.tax_rate, 0.0);
        assert_eq!(r.housing_cost, 0.0);
        assert_eq!(r.term_months, 60);

        let out = evaluate_loan(&r).unwrap();
        assert_eq!(out.dti, 0.05);
    }
}
