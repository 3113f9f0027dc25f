//! Marginal abatement cost of switching from one scenario to another.
//!
//! `MAC = (NPV_before − NPV_after) / (ΔCO2e per year × tracking years)`.
//! A negative MAC means the switch saves money per tonne abated.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::abatement::scenario::{appraise_scenario, InvestmentScenario, ScenarioAppraisal};
use crate::arith::Arith;
use crate::config::EngineConfig;
use crate::coerce::parse_decimal;
use crate::format::{money, thousands};
use crate::types::{with_metadata, ComputationOutput, Money, Tonnes};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// A before/after scenario pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacInput {
    #[serde(default = "InvestmentScenario::before", alias = "option1")]
    pub before: InvestmentScenario,
    #[serde(default = "InvestmentScenario::after", alias = "option2")]
    pub after: InvestmentScenario,
}

/// The figures behind a MAC value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacFigures {
    pub label_before: String,
    pub label_after: String,
    pub npv_before: Money,
    pub npv_after: Money,
    /// `npv_before − npv_after`
    pub net_npv: Money,
    /// `before.co2_reduction − after.co2_reduction` (tCO2e/yr)
    pub annual_co2_diff: Tonnes,
    /// Longer of the two tracking periods, at least 1.
    pub tracking_years: u32,
    /// `annual_co2_diff × tracking_years`
    pub total_co2_diff: Tonnes,
    /// `net_npv / total_co2_diff`, zero when no CO2e difference.
    pub mac: Money,
}

/// Full MAC output: both appraisals, the figures and the summary text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacOutput {
    pub before: ScenarioAppraisal,
    pub after: ScenarioAppraisal,
    pub figures: MacFigures,
    pub summary: String,
}

/// Values read back from a summary text block. Missing lines stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSummary {
    pub npv_before: Option<Money>,
    pub npv_after: Option<Money>,
    pub net_npv: Option<Money>,
    pub annual_co2_diff: Option<Tonnes>,
    pub tracking_years: Option<u32>,
    pub total_co2_diff: Option<Tonnes>,
    pub mac: Option<Money>,
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

/// MAC from two scenarios. Never fails; zero CO2e difference gives zero MAC.
pub fn marginal_abatement_cost(before: &InvestmentScenario, after: &InvestmentScenario) -> MacFigures {
    let npv_before = appraise_scenario(before).result.npv;
    let npv_after = appraise_scenario(after).result.npv;
    figures_from(before, after, npv_before, npv_after, &Arith::new())
}

fn figures_from(
    before: &InvestmentScenario,
    after: &InvestmentScenario,
    npv_before: Money,
    npv_after: Money,
    arith: &Arith,
) -> MacFigures {
    let net_npv = arith.sub(npv_before, npv_after);
    let annual_co2_diff = arith.sub(before.co2_reduction, after.co2_reduction);
    let tracking_years = before
        .emission_tracking_period
        .max(after.emission_tracking_period)
        .max(1);
    let total_co2_diff = arith.mul(annual_co2_diff, Decimal::from(tracking_years));
    let mac = arith.div(net_npv, total_co2_diff);

    MacFigures {
        label_before: label_or(&before.label, "Before Scenario"),
        label_after: label_or(&after.label, "After Scenario"),
        npv_before,
        npv_after,
        net_npv,
        annual_co2_diff,
        tracking_years,
        total_co2_diff,
        mac,
    }
}

fn label_or(label: &str, fallback: &str) -> String {
    if label.trim().is_empty() {
        fallback.to_string()
    } else {
        label.to_string()
    }
}

/// Seven-line summary with thousands separators, e.g.
/// `MAC Value: ₹-10.00/ton CO₂e`.
pub fn summary_text(figures: &MacFigures, currency_symbol: &str) -> String {
    let lines = [
        format!(
            "{} NPV: {}",
            figures.label_before,
            money(currency_symbol, figures.npv_before)
        ),
        format!(
            "{} NPV: {}",
            figures.label_after,
            money(currency_symbol, figures.npv_after)
        ),
        format!(
            "Net NPV ({} - {}): {}",
            figures.label_before,
            figures.label_after,
            money(currency_symbol, figures.net_npv)
        ),
        format!(
            "Annual CO₂e Difference: {} tons/year",
            thousands(figures.annual_co2_diff, 0)
        ),
        format!("Tracking Period: {} years", figures.tracking_years),
        format!(
            "Total CO₂e Difference: {} tons",
            thousands(figures.total_co2_diff, 0)
        ),
        format!(
            "MAC Value: {}/ton CO₂e",
            money(currency_symbol, figures.mac)
        ),
    ];
    lines.join("\n")
}

/// First signed number after the `:` of a summary line.
fn number_after_colon(line: &str) -> Option<Decimal> {
    let (_, rest) = line.split_once(':')?;
    let start = rest.find(|c: char| c.is_ascii_digit() || c == '-')?;
    let token: String = rest[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '-' || *c == '.' || *c == ',')
        .collect();
    if !token.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(parse_decimal(&token))
}

/// Read a summary block back into numbers. Lines are matched by their
/// labels; the first two `... NPV:` lines are before and after.
pub fn parse_summary_text(text: &str) -> ParsedSummary {
    let mut parsed = ParsedSummary::default();
    let mut npv_lines_seen = 0;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("Net NPV") {
            parsed.net_npv = number_after_colon(line);
        } else if line.starts_with("Annual CO") {
            parsed.annual_co2_diff = number_after_colon(line);
        } else if line.starts_with("Tracking Period") {
            parsed.tracking_years =
                number_after_colon(line).map(crate::coerce::decimal_to_count);
        } else if line.starts_with("Total CO") {
            parsed.total_co2_diff = number_after_colon(line);
        } else if line.starts_with("MAC Value") {
            parsed.mac = number_after_colon(line);
        } else if line.contains(" NPV:") {
            match npv_lines_seen {
                0 => parsed.npv_before = number_after_colon(line),
                1 => parsed.npv_after = number_after_colon(line),
                _ => {}
            }
            npv_lines_seen += 1;
        }
    }
    parsed
}

/// Appraise both scenarios and compute the MAC with its summary text.
pub fn calculate_mac(input: &MacInput, config: &EngineConfig) -> ComputationOutput<MacOutput> {
    let start = Instant::now();

    let before = appraise_scenario(&input.before);
    let after = appraise_scenario(&input.after);

    let mut warnings: Vec<String> = Vec::new();
    warnings.extend(before.warnings);
    warnings.extend(after.warnings);

    let arith = Arith::new();
    let figures = figures_from(
        &input.before,
        &input.after,
        before.result.npv,
        after.result.npv,
        &arith,
    );
    arith.warn_into(&mut warnings, "MAC");
    if figures.total_co2_diff.is_zero() {
        warnings.push("No CO2e difference between scenarios; MAC set to zero.".into());
    }
    let summary = summary_text(&figures, &config.currency_symbol);

    let output = MacOutput {
        before: before.result,
        after: after.result,
        figures,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Marginal abatement cost: (NPV before - NPV after) / total CO2e difference",
        input,
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
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    /// Before NPV −1000, after NPV −500, 50 t/yr difference over 1 year.
    fn pair() -> (InvestmentScenario, InvestmentScenario) {
        let before = InvestmentScenario {
            label: "Before Scenario".into(),
            capex_own: dec!(1000),
            lifetime: 1,
            discount_rate: Decimal::ZERO,
            co2_reduction: dec!(100),
            emission_tracking_period: 1,
            ..Default::default()
        };
        let after = InvestmentScenario {
            label: "After Scenario".into(),
            capex_own: dec!(500),
            lifetime: 1,
            discount_rate: Decimal::ZERO,
            co2_reduction: dec!(50),
            emission_tracking_period: 1,
            ..Default::default()
        };
        (before, after)
    }

    #[test]
    fn test_mac_sign_convention() {
        let (before, after) = pair();
        let f = marginal_abatement_cost(&before, &after);
        assert_eq!(f.npv_before, dec!(-1000));
        assert_eq!(f.npv_after, dec!(-500));
        assert_eq!(f.net_npv, dec!(-500));
        assert_eq!(f.annual_co2_diff, dec!(50));
        assert_eq!(f.tracking_years, 1);
        assert_eq!(f.total_co2_diff, dec!(50));
        assert_eq!(f.mac, dec!(-10));
    }

    #[test]
    fn test_overflowing_npv_difference_yields_zero_mac() {
        let before = InvestmentScenario {
            opex_regular_costs: dec!(50000000000000000000000000000),
            ..pair().0
        };
        let after = InvestmentScenario {
            capex_own: dec!(-50000000000000000000000000000),
            ..pair().1
        };
        let f = marginal_abatement_cost(&before, &after);
        assert_eq!(f.net_npv, Decimal::ZERO);
        assert_eq!(f.mac, Decimal::ZERO);

        let out = calculate_mac(&MacInput { before, after }, &EngineConfig::default());
        assert_eq!(out.result.figures.net_npv, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.starts_with("MAC") && w.contains("overflowed")));
    }

    #[test]
    fn test_summary_text_format() {
        let (before, after) = pair();
        let f = marginal_abatement_cost(&before, &after);
        let expected = "Before Scenario NPV: ₹-1,000.00\n\
                        After Scenario NPV: ₹-500.00\n\
                        Net NPV (Before Scenario - After Scenario): ₹-500.00\n\
                        Annual CO₂e Difference: 50 tons/year\n\
                        Tracking Period: 1 years\n\
                        Total CO₂e Difference: 50 tons\n\
                        MAC Value: ₹-10.00/ton CO₂e";
        assert_eq!(summary_text(&f, "₹"), expected);
    }

    #[test]
    fn test_zero_co2_difference() {
        let (before, mut after) = pair();
        after.co2_reduction = before.co2_reduction;
        let out = calculate_mac(
            &MacInput { before, after },
            &EngineConfig::default(),
        );
        assert_eq!(out.result.figures.mac, Decimal::ZERO);
        assert_eq!(out.result.figures.total_co2_diff, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("No CO2e difference")));
    }

    #[test]
    fn test_tracking_takes_longer_period() {
        let (mut before, mut after) = pair();
        before.emission_tracking_period = 0;
        after.emission_tracking_period = 0;
        assert_eq!(marginal_abatement_cost(&before, &after).tracking_years, 1);
        after.emission_tracking_period = 7;
        let f = marginal_abatement_cost(&before, &after);
        assert_eq!(f.tracking_years, 7);
        assert_eq!(f.total_co2_diff, dec!(350));
    }

    #[test]
    fn test_parse_summary_round_trip() {
        let (before, after) = pair();
        let f = marginal_abatement_cost(&before, &after);
        let parsed = parse_summary_text(&summary_text(&f, "₹"));
        assert_eq!(parsed.npv_before, Some(dec!(-1000)));
        assert_eq!(parsed.npv_after, Some(dec!(-500)));
        assert_eq!(parsed.net_npv, Some(dec!(-500)));
        assert_eq!(parsed.annual_co2_diff, Some(dec!(50)));
        assert_eq!(parsed.tracking_years, Some(1));
        assert_eq!(parsed.total_co2_diff, Some(dec!(50)));
        assert_eq!(parsed.mac, Some(dec!(-10)));
    }

    #[test]
    fn test_parse_large_values_with_separators() {
        let text = "Annual CO₂e Difference: 34,500 tons/year\nMAC Value: $1,234.56/ton CO₂e";
        let parsed = parse_summary_text(text);
        assert_eq!(parsed.annual_co2_diff, Some(dec!(34500)));
        assert_eq!(parsed.mac, Some(dec!(1234.56)));
        assert_eq!(parsed.npv_before, None);
    }

    #[test]
    fn test_configured_currency_symbol() {
        let (before, after) = pair();
        let cfg = EngineConfig {
            currency_symbol: "$".into(),
            ..Default::default()
        };
        let out = calculate_mac(&MacInput { before, after }, &cfg);
        assert!(out.result.summary.ends_with("MAC Value: $-10.00/ton CO₂e"));
    }
}
