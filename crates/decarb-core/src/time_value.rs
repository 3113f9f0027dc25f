use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::DecarbError;
use crate::types::{Money, Percent, Rate};
use crate::DecarbResult;

/// Convert a user-entered percentage (8 = 8%) into a decimal rate.
pub fn pct_to_rate(pct: Percent) -> Rate {
    pct / dec!(100)
}

/// `base^periods` by binary exponentiation. `None` on overflow.
pub fn compound(base: Decimal, periods: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut square = base;
    let mut n = periods;
    while n > 0 {
        if n & 1 == 1 {
            result = result.checked_mul(square)?;
        }
        n >>= 1;
        if n > 0 {
            square = square.checked_mul(square)?;
        }
    }
    Some(result)
}

/// Net Present Value of a series of cash flows.
///
/// `cash_flows[t]` is discounted by `(1 + rate)^t`, so index 0 is the
/// undiscounted time-of-decision amount.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> DecarbResult<Money> {
    if rate <= dec!(-1) {
        return Err(DecarbError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| DecarbError::Overflow {
            context: "NPV discount base".into(),
        })?;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount
                .checked_mul(one_plus_r)
                .ok_or_else(|| DecarbError::Overflow {
                    context: format!("NPV discount factor at period {t}"),
                })?;
        }
        if discount.is_zero() {
            return Err(DecarbError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        let pv = cf.checked_div(discount).ok_or_else(|| DecarbError::Overflow {
            context: format!("NPV present value at period {t}"),
        })?;
        result = result.checked_add(pv).ok_or_else(|| DecarbError::Overflow {
            context: "NPV sum".into(),
        })?;
    }

    Ok(result)
}

/// Payment (PMT) of a level annuity.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> DecarbResult<Money> {
    if nper == 0 {
        return Err(DecarbError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    let overflow = |context: &str| DecarbError::Overflow {
        context: context.to_string(),
    };

    if rate.is_zero() {
        let total = present_value
            .checked_add(future_value)
            .ok_or_else(|| overflow("PMT total"))?;
        return Ok(-total / Decimal::from(nper));
    }

    let factor = Decimal::ONE
        .checked_add(rate)
        .and_then(|base| compound(base, nper))
        .ok_or_else(|| overflow("PMT compounding factor"))?;
    let annuity_factor = factor
        .checked_sub(Decimal::ONE)
        .and_then(|growth| growth.checked_div(rate))
        .ok_or_else(|| overflow("PMT annuity factor"))?;

    if annuity_factor.is_zero() {
        return Err(DecarbError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    let future = present_value
        .checked_mul(factor)
        .and_then(|fv| fv.checked_add(future_value))
        .ok_or_else(|| overflow("PMT future value"))?;
    future
        .checked_div(annuity_factor)
        .map(|p| -p)
        .ok_or_else(|| overflow("PMT payment"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // NPV at 10%: -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(1.0));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(300), dec!(300), dec!(300)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(200));
    }

    #[test]
    fn test_npv_rejects_minus_100_pct() {
        assert!(npv(dec!(-1), &[dec!(100), dec!(100)]).is_err());
    }

    #[test]
    fn test_npv_empty_series() {
        assert_eq!(npv(dec!(0.08), &[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_compound() {
        assert_eq!(compound(dec!(1.1), 0), Some(Decimal::ONE));
        assert_eq!(compound(dec!(1.1), 2), Some(dec!(1.21)));
        assert_eq!(compound(dec!(0.9), 3), Some(dec!(0.729)));
        assert_eq!(compound(Decimal::MAX, 2), None);
    }

    #[test]
    fn test_pmt_loan() {
        // 100,000 over 5 years at 10% ≈ -26,379.75 per year
        let result = pmt(dec!(0.10), 5, dec!(100000), Decimal::ZERO).unwrap();
        assert!((result - dec!(-26379.75)).abs() < dec!(0.01));
    }

    #[test]
    fn test_pmt_zero_rate() {
        let result = pmt(Decimal::ZERO, 4, dec!(1000), Decimal::ZERO).unwrap();
        assert_eq!(result, dec!(-250));
    }

    #[test]
    fn test_pmt_overflow_is_an_error() {
        assert!(pmt(dec!(0.10), 5, Decimal::MAX, Decimal::ZERO).is_err());
        assert!(pmt(Decimal::ZERO, 2, Decimal::MAX, Decimal::MAX).is_err());
    }

    #[test]
    fn test_pmt_zero_periods_rejected() {
        assert!(pmt(dec!(0.05), 0, dec!(1000), Decimal::ZERO).is_err());
    }
}
