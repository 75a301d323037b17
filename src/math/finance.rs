//! Loan arithmetic.

/// Level monthly payment of a fully amortizing loan.
///
/// `payment = P r / (1 - (1 + r)^-n)` with monthly rate `r = annual_rate / 12`.
/// A zero rate degenerates to straight-line repayment `P / n`.
pub fn monthly_payment(principal: f64, annual_rate: f64, term_months: f64) -> f64 {
    let r = annual_rate / 12.0;
    if r == 0.0 {
        return principal / term_months;
    }
    principal * r / (1.0 - (1.0 + r).powf(-term_months))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_matches_standard_amortization_table() {
        // 25k over 60 months at 8% APR is the textbook 506.91/month.
        let pmt = monthly_payment(25_000.0, 0.08, 60.0);
        assert!((pmt - 506.91).abs() < 0.01, "got {pmt}");
    }

    #[test]
    fn zero_rate_is_straight_line() {
        assert_eq!(monthly_payment(12_000.0, 0.0, 48.0), 250.0);
    }

    #[test]
    fn longer_terms_lower_the_payment() {
        let short = monthly_payment(25_000.0, 0.08, 36.0);
        let long = monthly_payment(25_000.0, 0.08, 84.0);
        assert!(long < short);
        assert!(long * 84.0 > short * 36.0);
    }
}
