//! Fixed-rate amortization payment.

/// Standard amortizing-loan monthly payment:
/// `r = rate/100/12`, `n = years*12`, `P*r / (1 - (1+r)^-n)`.
///
/// A zero rate falls out of the formula as NaN (0/0) and a zero term as
/// infinity (division by `1 - 1`); neither is special-cased.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, years: f64) -> f64 {
    let rate = annual_rate_pct / 100.0 / 12.0;
    let num_payments = years * 12.0;
    principal * rate / (1.0 - (1.0 + rate).powf(-num_payments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_year_loan_at_six_percent() {
        let payment = monthly_payment(300_000.0, 6.0, 30.0);
        assert!((payment - 1798.65).abs() < 0.01, "payment = {payment}");
    }

    #[test]
    fn fifteen_year_loan_costs_more_per_month() {
        let thirty = monthly_payment(300_000.0, 6.0, 30.0);
        let fifteen = monthly_payment(300_000.0, 6.0, 15.0);
        assert!(fifteen > thirty);
    }

    #[test]
    fn zero_rate_divides_to_nan() {
        assert!(monthly_payment(300_000.0, 0.0, 30.0).is_nan());
    }

    #[test]
    fn zero_term_divides_to_infinity() {
        // (1+r)^-0 == 1, so the denominator is exactly zero against a
        // nonzero numerator
        let payment = monthly_payment(300_000.0, 6.0, 0.0);
        assert!(payment.is_infinite());
        assert!(!payment.is_nan());
    }
}
