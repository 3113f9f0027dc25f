//! Investment scenario cashflows and NPV.
//!
//! A scenario is one way of running an asset over its lifetime: up-front
//! capital, operating costs that inflate each year, a benefit stream that
//! declines, and terminal salvage/residual values. The series has one value
//! per year from 0 (decision) to `lifetime`.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::arith::Arith;
use crate::time_value::{compound, npv, pct_to_rate, pmt};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Tonnes};

/// Lifetimes beyond this are clamped to bound the schedule's size.
pub const MAX_LIFETIME_YEARS: u32 = 10_000;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// How the up-front investment is financed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalSource {
    #[default]
    #[serde(alias = "Own Investment", alias = "own_investment")]
    Own,
    #[serde(alias = "Loan")]
    Loan,
}

/// One side of a before/after comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentScenario {
    pub label: String,
    pub capex_type: CapitalSource,
    /// Investment when self-financed.
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub capex_own: Money,
    /// Investment when financed by loan.
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub capex_loan_principal: Money,
    /// Loan interest (percent). Informational only.
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub capex_loan_interest: Percent,
    /// Loan repayment period in years. Informational only.
    #[serde(deserialize_with = "crate::coerce::count")]
    pub capex_loan_period: u32,
    /// Reinvestment is recorded but does not enter the cashflow.
    pub reinvestment: bool,
    #[serde(deserialize_with = "crate::coerce::count")]
    pub reinvestment_year: u32,
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub reinvestment_amount: Money,
    /// Annual operating cost other than fuel/energy, year-1 value.
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub opex_regular_costs: Money,
    /// General inflation applied to `opex_regular_costs` (percent).
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub inflation_rate: Percent,
    /// Annual fuel/energy cost, year-1 value.
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub opex_fuel_energy_cost: Money,
    /// Inflation applied to `opex_fuel_energy_cost` (percent).
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub fuel_energy_inflation: Percent,
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub salvage_value: Money,
    #[serde(deserialize_with = "crate::coerce::count")]
    pub year_of_salvage: u32,
    /// Added to the final year regardless of sign.
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub residual_value: Money,
    /// Year-1 benefit.
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub annual_benefit: Money,
    /// Number of years the benefit is received.
    #[serde(deserialize_with = "crate::coerce::count")]
    pub benefit_duration: u32,
    /// Annual decline of the benefit (percent).
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub benefit_decline_rate: Percent,
    #[serde(deserialize_with = "crate::coerce::count")]
    pub lifetime: u32,
    /// Discount rate (percent).
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub discount_rate: Percent,
    /// Annual CO2e emitted under this scenario (tCO2e/yr).
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub co2_reduction: Tonnes,
    #[serde(deserialize_with = "crate::coerce::count")]
    pub emission_tracking_period: u32,
}

impl Default for InvestmentScenario {
    fn default() -> Self {
        Self {
            label: String::new(),
            capex_type: CapitalSource::Own,
            capex_own: Decimal::ZERO,
            capex_loan_principal: Decimal::ZERO,
            capex_loan_interest: Decimal::ZERO,
            capex_loan_period: 0,
            reinvestment: false,
            reinvestment_year: 0,
            reinvestment_amount: Decimal::ZERO,
            opex_regular_costs: Decimal::ZERO,
            inflation_rate: Decimal::ZERO,
            opex_fuel_energy_cost: Decimal::ZERO,
            fuel_energy_inflation: Decimal::ZERO,
            salvage_value: Decimal::ZERO,
            year_of_salvage: 0,
            residual_value: Decimal::ZERO,
            annual_benefit: Decimal::ZERO,
            benefit_duration: 0,
            benefit_decline_rate: Decimal::ZERO,
            lifetime: 10,
            discount_rate: dec!(8.0),
            co2_reduction: Decimal::ZERO,
            emission_tracking_period: 10,
        }
    }
}

impl InvestmentScenario {
    pub fn before() -> Self {
        Self {
            label: "Before Scenario".into(),
            ..Default::default()
        }
    }

    pub fn after() -> Self {
        Self {
            label: "After Scenario".into(),
            ..Default::default()
        }
    }

    /// Up-front amount for the chosen capital source.
    pub fn investment(&self) -> Money {
        match self.capex_type {
            CapitalSource::Own => self.capex_own,
            CapitalSource::Loan => self.capex_loan_principal,
        }
    }

    /// Lifetime clamped to [`MAX_LIFETIME_YEARS`].
    pub fn effective_lifetime(&self) -> u32 {
        self.lifetime.min(MAX_LIFETIME_YEARS)
    }
}

/// One year of a scenario's cashflow schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowYear {
    pub year: u32,
    pub investment: Money,
    pub benefit: Money,
    pub opex_regular: Money,
    pub opex_fuel: Money,
    pub salvage: Money,
    pub residual: Money,
    /// `benefit − opex_regular − opex_fuel + salvage + residual − investment`
    pub net: Money,
    pub discount_factor: Decimal,
    pub present_value: Money,
}

/// Appraisal of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAppraisal {
    pub label: String,
    pub investment: Money,
    pub lifetime: u32,
    pub schedule: Vec<CashflowYear>,
    /// Net cashflow per year, index 0 = decision year.
    pub series: Vec<Money>,
    pub npv: Money,
    /// Level annual loan payment over the repayment period. Not part of the NPV.
    pub loan_annual_payment: Option<Money>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `amount × (1 + pct/100)^periods`, zero on overflow.
fn grown(amount: Money, pct: Percent, periods: u32, arith: &Arith) -> Money {
    if amount.is_zero() {
        return Decimal::ZERO;
    }
    let base = arith.add(Decimal::ONE, pct_to_rate(pct));
    arith.or_zero(compound(base, periods).and_then(|factor| amount.checked_mul(factor)))
}

fn build_schedule(scenario: &InvestmentScenario, warnings: &mut Vec<String>) -> Vec<CashflowYear> {
    let lifetime = scenario.effective_lifetime();
    if scenario.lifetime > MAX_LIFETIME_YEARS {
        warnings.push(format!(
            "Lifetime of {} years clamped to {MAX_LIFETIME_YEARS}",
            scenario.lifetime
        ));
    }

    let arith = Arith::new();
    let mut schedule: Vec<CashflowYear> = (0..=lifetime)
        .map(|year| {
            let mut row = CashflowYear {
                year,
                investment: Decimal::ZERO,
                benefit: Decimal::ZERO,
                opex_regular: Decimal::ZERO,
                opex_fuel: Decimal::ZERO,
                salvage: Decimal::ZERO,
                residual: Decimal::ZERO,
                net: Decimal::ZERO,
                discount_factor: Decimal::ONE,
                present_value: Decimal::ZERO,
            };
            if year == 0 {
                row.investment = scenario.investment();
                return row;
            }
            let elapsed = year - 1;
            if year <= scenario.benefit_duration {
                row.benefit = grown(
                    scenario.annual_benefit,
                    -scenario.benefit_decline_rate,
                    elapsed,
                    &arith,
                );
            }
            row.opex_regular = grown(
                scenario.opex_regular_costs,
                scenario.inflation_rate,
                elapsed,
                &arith,
            );
            row.opex_fuel = grown(
                scenario.opex_fuel_energy_cost,
                scenario.fuel_energy_inflation,
                elapsed,
                &arith,
            );
            row
        })
        .collect();

    if scenario.salvage_value > Decimal::ZERO && scenario.year_of_salvage <= lifetime {
        schedule[scenario.year_of_salvage as usize].salvage = scenario.salvage_value;
    } else if scenario.salvage_value > Decimal::ZERO {
        warnings.push(format!(
            "{}: salvage year {} is after the lifetime; salvage ignored",
            label_or(scenario, "Scenario"),
            scenario.year_of_salvage
        ));
    }

    if let Some(last) = schedule.last_mut() {
        last.residual = scenario.residual_value;
    }

    for row in schedule.iter_mut() {
        let operating = arith.sub(arith.sub(row.benefit, row.opex_regular), row.opex_fuel);
        let terminal = arith.add(row.salvage, row.residual);
        row.net = arith.sub(arith.add(operating, terminal), row.investment);
    }

    arith.warn_into(warnings, label_or(scenario, "Scenario"));
    schedule
}

fn label_or<'a>(scenario: &'a InvestmentScenario, fallback: &'a str) -> &'a str {
    if scenario.label.trim().is_empty() {
        fallback
    } else {
        &scenario.label
    }
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

/// Net cashflow series: `lifetime + 1` values, index 0 is `−investment`.
pub fn build_cashflow_series(scenario: &InvestmentScenario) -> Vec<Money> {
    let mut ignored = Vec::new();
    build_schedule(scenario, &mut ignored)
        .into_iter()
        .map(|row| row.net)
        .collect()
}

/// `Σ cf_t / (1 + pct/100)^t`. A rate at or below −100% or an overflow
/// yields zero.
pub fn net_present_value(series: &[Money], discount_pct: Percent) -> Money {
    npv(pct_to_rate(discount_pct), series).unwrap_or(Decimal::ZERO)
}

/// Build the cashflow schedule of a scenario and discount it.
pub fn appraise_scenario(scenario: &InvestmentScenario) -> ComputationOutput<ScenarioAppraisal> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut schedule = build_schedule(scenario, &mut warnings);
    let series: Vec<Money> = schedule.iter().map(|row| row.net).collect();
    let rate = pct_to_rate(scenario.discount_rate);

    let npv_value = match npv(rate, &series) {
        Ok(v) => v,
        Err(e) => {
            warnings.push(format!("{}: NPV set to zero ({e})", label_or(scenario, "Scenario")));
            Decimal::ZERO
        }
    };

    for row in schedule.iter_mut() {
        match Decimal::ONE
            .checked_add(rate)
            .and_then(|base| compound(base, row.year))
        {
            Some(d) if !d.is_zero() => {
                row.discount_factor = Decimal::ONE.checked_div(d).unwrap_or(Decimal::ZERO);
                row.present_value = row.net.checked_div(d).unwrap_or(Decimal::ZERO);
            }
            _ => {
                row.discount_factor = Decimal::ZERO;
                row.present_value = Decimal::ZERO;
            }
        }
    }

    let loan_annual_payment = match scenario.capex_type {
        CapitalSource::Loan if scenario.capex_loan_period > 0 => pmt(
            pct_to_rate(scenario.capex_loan_interest),
            scenario.capex_loan_period,
            scenario.capex_loan_principal,
            Decimal::ZERO,
        )
        .map(|p| -p)
        .ok(),
        _ => None,
    };

    if scenario.reinvestment && !scenario.reinvestment_amount.is_zero() {
        warnings.push(format!(
            "{}: reinvestment of {} in year {} is recorded but not included in the cashflow",
            label_or(scenario, "Scenario"),
            scenario.reinvestment_amount,
            scenario.reinvestment_year
        ));
    }

    let output = ScenarioAppraisal {
        label: scenario.label.clone(),
        investment: scenario.investment(),
        lifetime: scenario.effective_lifetime(),
        schedule,
        series,
        npv: npv_value,
        loan_annual_payment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Scenario cashflow NPV (benefit decline and opex inflation compounded on t-1)",
        scenario,
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> InvestmentScenario {
        InvestmentScenario {
            label: "Before Scenario".into(),
            capex_own: dec!(1000),
            annual_benefit: dec!(300),
            benefit_duration: 4,
            lifetime: 4,
            discount_rate: Decimal::ZERO,
            emission_tracking_period: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_series_shape() {
        let series = build_cashflow_series(&scenario());
        assert_eq!(series, vec![dec!(-1000), dec!(300), dec!(300), dec!(300), dec!(300)]);
    }

    #[test]
    fn test_npv_zero_rate_is_plain_sum() {
        let series = build_cashflow_series(&scenario());
        assert_eq!(net_present_value(&series, Decimal::ZERO), dec!(200));
    }

    #[test]
    fn test_benefit_declines_and_stops() {
        let s = InvestmentScenario {
            annual_benefit: dec!(100),
            benefit_decline_rate: dec!(10),
            benefit_duration: 2,
            lifetime: 3,
            ..Default::default()
        };
        let series = build_cashflow_series(&s);
        assert_eq!(series, vec![Decimal::ZERO, dec!(100), dec!(90), Decimal::ZERO]);
    }

    #[test]
    fn test_opex_inflates_from_year_one() {
        let s = InvestmentScenario {
            opex_regular_costs: dec!(100),
            inflation_rate: dec!(10),
            opex_fuel_energy_cost: dec!(50),
            fuel_energy_inflation: dec!(20),
            lifetime: 3,
            ..Default::default()
        };
        let series = build_cashflow_series(&s);
        assert_eq!(series[1], dec!(-150));
        assert_eq!(series[2], dec!(-170));
        assert_eq!(series[3], dec!(-193));
    }

    #[test]
    fn test_salvage_and_residual() {
        let s = InvestmentScenario {
            salvage_value: dec!(40),
            year_of_salvage: 2,
            residual_value: dec!(25),
            lifetime: 3,
            ..Default::default()
        };
        let series = build_cashflow_series(&s);
        assert_eq!(series, vec![Decimal::ZERO, Decimal::ZERO, dec!(40), dec!(25)]);
    }

    #[test]
    fn test_salvage_after_lifetime_ignored() {
        let s = InvestmentScenario {
            salvage_value: dec!(40),
            year_of_salvage: 9,
            lifetime: 3,
            ..Default::default()
        };
        let out = appraise_scenario(&s);
        assert!(out.result.series.iter().all(|v| v.is_zero()));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_zero_lifetime_degenerates() {
        let s = InvestmentScenario {
            capex_own: dec!(500),
            residual_value: dec!(100),
            salvage_value: dec!(30),
            year_of_salvage: 0,
            lifetime: 0,
            ..Default::default()
        };
        let series = build_cashflow_series(&s);
        assert_eq!(series, vec![dec!(-370)]);
    }

    #[test]
    fn test_loan_principal_is_investment() {
        let s = InvestmentScenario {
            capex_type: CapitalSource::Loan,
            capex_own: dec!(999),
            capex_loan_principal: dec!(100000),
            capex_loan_interest: dec!(10),
            capex_loan_period: 5,
            lifetime: 1,
            ..Default::default()
        };
        let out = appraise_scenario(&s).result;
        assert_eq!(out.series[0], dec!(-100000));
        let payment = out.loan_annual_payment.unwrap();
        assert!((payment - dec!(26379.75)).abs() < dec!(0.01));
    }

    #[test]
    fn test_discount_rate_minus_100_gives_zero_npv() {
        let mut s = scenario();
        s.discount_rate = dec!(-100);
        let out = appraise_scenario(&s);
        assert_eq!(out.result.npv, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_lifetime_clamped() {
        let s = InvestmentScenario {
            lifetime: 100_000,
            ..Default::default()
        };
        let out = appraise_scenario(&s);
        assert_eq!(out.result.series.len(), MAX_LIFETIME_YEARS as usize + 1);
        assert!(out.warnings.iter().any(|w| w.contains("clamped")));
    }

    #[test]
    fn test_long_lifetime_keeps_full_series() {
        let s = InvestmentScenario {
            opex_regular_costs: dec!(10),
            lifetime: 300,
            discount_rate: Decimal::ZERO,
            ..Default::default()
        };
        let out = appraise_scenario(&s);
        assert_eq!(out.result.series.len(), 301);
        assert_eq!(out.result.npv, dec!(-3000));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_overflowing_costs_warn_instead_of_panicking() {
        let s = InvestmentScenario {
            label: "Huge".into(),
            opex_regular_costs: Decimal::MAX,
            opex_fuel_energy_cost: Decimal::MAX,
            lifetime: 1,
            ..Default::default()
        };
        assert_eq!(build_cashflow_series(&s), vec![Decimal::ZERO, Decimal::ZERO]);
        let out = appraise_scenario(&s);
        assert!(out.warnings.iter().any(|w| w.starts_with("Huge") && w.contains("overflowed")));
    }

    #[test]
    fn test_schedule_present_values_sum_to_npv() {
        let mut s = scenario();
        s.discount_rate = dec!(10);
        let out = appraise_scenario(&s).result;
        let pv_sum: Decimal = out.schedule.iter().map(|r| r.present_value).sum();
        assert!((pv_sum - out.npv).abs() < dec!(0.0001));
    }

    #[test]
    fn test_lenient_scenario_json() {
        let s: InvestmentScenario = serde_json::from_str(
            r#"{"capex_type": "Own Investment", "capex_own": "1,000", "lifetime": "", "discount_rate": null}"#,
        )
        .unwrap();
        assert_eq!(s.capex_own, dec!(1000));
        assert_eq!(s.lifetime, 0);
        assert_eq!(s.discount_rate, Decimal::ZERO);
        assert_eq!(s.emission_tracking_period, 10);
    }
}
