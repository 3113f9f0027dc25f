//! Baseline vs business-as-usual vs target decomposition.
//!
//! BAU projects the previous year's emissions to the target year at the
//! previous year's intensity:
//!
//! * growth factor = target production / previous production
//! * BAU = previous × growth factor
//! * target = baseline × (1 − reduction%)
//! * avoided = BAU − target
//!
//! Specific (intensity) values divide by the production of the matching
//! year. Zero production gives zero intensity.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::arith::Arith;
use crate::config::EngineConfig;
use crate::inventory::calculation::FuelEnergyCalculation;
use crate::inventory::factors::{inventory_totals, unit_warnings, InventoryTotals};
use crate::types::{with_metadata, ComputationOutput, Scope, ScopeValues, Tonnes};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// One line of the emission summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionSummaryRow {
    /// "Scope 1".."Scope 3" or "Total".
    pub label: String,
    pub baseline_abs: Tonnes,
    pub baseline_sp: Decimal,
    pub previous_abs: Tonnes,
    pub previous_sp: Decimal,
    pub bau_abs: Tonnes,
    pub bau_sp: Decimal,
    pub target_abs: Tonnes,
    pub target_sp: Decimal,
    /// Avoided emissions vs BAU.
    pub reduction_abs: Tonnes,
    pub reduction_sp: Decimal,
}

/// How a waterfall bar relates to the running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterfallMeasure {
    /// Starting point.
    Absolute,
    /// Change from the running total.
    Relative,
    /// Running total so far.
    Total,
}

/// One bar in an emission pathway chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallStep {
    pub label: String,
    pub value: Tonnes,
    pub measure: WaterfallMeasure,
}

impl WaterfallStep {
    pub fn new(label: impl Into<String>, value: Tonnes, measure: WaterfallMeasure) -> Self {
        Self {
            label: label.into(),
            value,
            measure,
        }
    }
}

/// Full baseline/BAU/target analysis of a fuel/energy calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryAnalysis {
    pub same_year: bool,
    pub target_production: Decimal,
    /// target production / previous production (0 when previous is 0).
    pub growth_factor: Decimal,
    pub previous: ScopeValues,
    pub baseline: ScopeValues,
    pub bau: ScopeValues,
    pub target: ScopeValues,
    pub avoided: ScopeValues,
    pub total_previous: Tonnes,
    pub total_baseline: Tonnes,
    pub total_bau: Tonnes,
    pub total_target: Tonnes,
    pub total_avoided: Tonnes,
    /// Three scope rows followed by the total row.
    pub summary_table: Vec<EmissionSummaryRow>,
    /// BAU → avoided → target.
    pub pathway: Vec<WaterfallStep>,
    pub inventory: InventoryTotals,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `emission / production`, zero when production is zero.
pub fn specific(emission: Decimal, production: Decimal) -> Decimal {
    if production.is_zero() {
        return Decimal::ZERO;
    }
    emission.checked_div(production).unwrap_or(Decimal::ZERO)
}

/// `target / previous` production, zero when previous production is zero.
pub fn growth_factor(target_production: Decimal, previous_production: Decimal) -> Decimal {
    specific(target_production, previous_production)
}

/// `baseline × (1 − pct/100)` per scope.
pub fn target_emissions(baseline: &ScopeValues, reduction_pct: &ScopeValues, arith: &Arith) -> ScopeValues {
    baseline.map(|scope, b| {
        let remaining = arith.sub(Decimal::ONE, reduction_pct.get(scope) / dec!(100));
        arith.mul(b, remaining)
    })
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

/// Decompose a fuel/energy calculation into baseline, previous, BAU,
/// target and avoided emissions.
pub fn analyze_inventory(
    calc: &FuelEnergyCalculation,
    config: &EngineConfig,
) -> ComputationOutput<InventoryAnalysis> {
    let start = Instant::now();
    let arith = Arith::new();
    let mut warnings = unit_warnings(&calc.rows, config);

    if calc.horizon_years() <= 0 {
        warnings.push(format!(
            "Target year {} is not after baseline year {}",
            calc.target_year, calc.baseline_year
        ));
    }
    if calc.previous_production.is_zero() {
        warnings.push("Previous-year production is zero; growth factor and BAU are zero.".into());
    }

    let target_production = calc.target_production();
    let factor = growth_factor(target_production, calc.previous_production);

    let previous = calc.previous_emissions(&arith);
    let resolved = calc.resolve_baseline(&arith);
    if !resolved.from_rows && calc.baseline_override.is_none() {
        warnings.push(format!(
            "Previous year {} differs from baseline year {} but no baseline emissions were given; baseline is zero.",
            calc.previous_year, calc.baseline_year
        ));
    }
    let baseline = resolved.by_scope;
    let bau = previous.map(|_, p| arith.mul(p, factor));
    let target = target_emissions(&baseline, &calc.reduction_pct, &arith);
    let avoided = bau.map(|scope, b| arith.sub(b, target.get(scope)));

    let mut summary_table: Vec<EmissionSummaryRow> = Scope::ALL
        .iter()
        .map(|&scope| {
            let previous_sp = specific(previous.get(scope), calc.previous_production);
            let target_sp = specific(target.get(scope), target_production);
            EmissionSummaryRow {
                label: scope.label().to_string(),
                baseline_abs: baseline.get(scope),
                baseline_sp: specific(baseline.get(scope), calc.baseline_production),
                previous_abs: previous.get(scope),
                previous_sp,
                bau_abs: bau.get(scope),
                bau_sp: previous_sp,
                target_abs: target.get(scope),
                target_sp,
                reduction_abs: avoided.get(scope),
                reduction_sp: arith.sub(previous_sp, target_sp),
            }
        })
        .collect();

    let total_previous = previous.total(&arith);
    let total_baseline = baseline.total(&arith);
    let total_bau = bau.total(&arith);
    let total_target = target.total(&arith);
    let total_avoided = arith.sub(total_bau, total_target);

    let total_bau_sp = specific(total_bau, target_production);
    let total_target_sp = specific(total_target, target_production);
    summary_table.push(EmissionSummaryRow {
        label: "Total".to_string(),
        baseline_abs: total_baseline,
        baseline_sp: specific(total_baseline, calc.baseline_production),
        previous_abs: total_previous,
        previous_sp: specific(total_previous, calc.previous_production),
        bau_abs: total_bau,
        bau_sp: total_bau_sp,
        target_abs: total_target,
        target_sp: total_target_sp,
        reduction_abs: total_avoided,
        reduction_sp: arith.sub(total_bau_sp, total_target_sp),
    });

    let pathway = vec![
        WaterfallStep::new(
            format!("BAU ({})", calc.target_year),
            total_bau,
            WaterfallMeasure::Absolute,
        ),
        WaterfallStep::new("Avoided Emissions", -total_avoided, WaterfallMeasure::Relative),
        WaterfallStep::new(
            format!("Target ({})", calc.target_year),
            total_target,
            WaterfallMeasure::Total,
        ),
    ];

    let inventory = inventory_totals(&calc.rows, &arith);
    arith.warn_into(&mut warnings, "Inventory");

    let output = InventoryAnalysis {
        same_year: calc.same_year(),
        target_production,
        growth_factor: factor,
        previous,
        baseline,
        bau,
        target,
        avoided,
        total_previous,
        total_baseline,
        total_bau,
        total_target,
        total_avoided,
        summary_table,
        pathway,
        inventory,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Baseline vs BAU vs target decomposition (BAU at previous-year intensity)",
        &serde_json::json!({
            "org_name": calc.org_name,
            "baseline_year": calc.baseline_year,
            "previous_year": calc.previous_year,
            "target_year": calc.target_year,
            "growth_rate_pct": calc.growth_rate.to_string(),
        }),
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
    use crate::inventory::factors::EmissionFactorRow;

    fn calc() -> FuelEnergyCalculation {
        FuelEnergyCalculation {
            org_name: "Acme".into(),
            baseline_year: 2020,
            previous_year: 2020,
            target_year: 2030,
            baseline_production: dec!(1000),
            previous_production: dec!(1000),
            growth_rate: Decimal::ZERO,
            rows: vec![
                EmissionFactorRow::new(Scope::Scope1, "Coal", "tons", dec!(100), dec!(10), dec!(25), "GJ"),
                EmissionFactorRow::new(Scope::Scope2, "Electricity", "kWh", dec!(1000), dec!(0.5), dec!(0.0036), "GJ"),
            ],
            reduction_pct: ScopeValues::new(dec!(20), dec!(50), Decimal::ZERO),
            ..Default::default()
        }
    }

    #[test]
    fn test_same_year_decomposition() {
        let out = analyze_inventory(&calc(), &EngineConfig::default()).result;
        assert!(out.same_year);
        assert_eq!(out.growth_factor, Decimal::ONE);
        assert_eq!(out.baseline.scope1, dec!(1000));
        assert_eq!(out.bau.scope1, dec!(1000));
        assert_eq!(out.target.scope1, dec!(800));
        assert_eq!(out.target.scope2, dec!(250));
        assert_eq!(out.avoided.scope1, dec!(200));
        assert_eq!(out.total_avoided, dec!(450));
        assert_eq!(out.summary_table.len(), 4);
        assert_eq!(out.summary_table[3].label, "Total");
    }

    #[test]
    fn test_avoided_with_override_baseline() {
        // previous 1000 at 1000 units, production doubles, override baseline 2000, 60% cut
        let mut c = calc();
        c.rows.truncate(1);
        c.previous_year = 2023;
        c.previous_production = dec!(1000);
        c.baseline_production = dec!(1000);
        c.growth_rate = Decimal::ZERO;
        c.baseline_override = Some(ScopeValues::new(dec!(2000), Decimal::ZERO, Decimal::ZERO));
        c.reduction_pct = ScopeValues::new(dec!(60), Decimal::ZERO, Decimal::ZERO);

        let out = analyze_inventory(&c, &EngineConfig::default()).result;
        assert!(!out.same_year);
        assert_eq!(out.previous.scope1, dec!(1000));
        assert_eq!(out.target.scope1, dec!(800));
        assert_eq!(out.avoided.scope1, dec!(200));
    }

    #[test]
    fn test_growth_scales_bau_not_intensity() {
        let mut c = calc();
        c.growth_rate = dec!(50);
        c.target_year = 2021;
        let out = analyze_inventory(&c, &EngineConfig::default()).result;
        assert_eq!(out.target_production, dec!(1500));
        assert_eq!(out.growth_factor, dec!(1.5));
        assert_eq!(out.bau.scope1, dec!(1500));
        assert_eq!(out.summary_table[0].bau_sp, out.summary_table[0].previous_sp);
        assert_eq!(out.summary_table[0].bau_sp, Decimal::ONE);
    }

    #[test]
    fn test_zero_previous_production() {
        let mut c = calc();
        c.previous_production = Decimal::ZERO;
        let out = analyze_inventory(&c, &EngineConfig::default());
        assert_eq!(out.result.growth_factor, Decimal::ZERO);
        assert_eq!(out.result.total_bau, Decimal::ZERO);
        assert_eq!(out.result.summary_table[0].previous_sp, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("Previous-year production")));
    }

    #[test]
    fn test_missing_override_warns() {
        let mut c = calc();
        c.previous_year = 2022;
        let out = analyze_inventory(&c, &EngineConfig::default());
        assert_eq!(out.result.total_baseline, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("no baseline emissions")));
    }

    #[test]
    fn test_pathway_steps() {
        let out = analyze_inventory(&calc(), &EngineConfig::default()).result;
        assert_eq!(out.pathway.len(), 3);
        assert_eq!(out.pathway[0].value, out.total_bau);
        assert_eq!(out.pathway[1].value, -out.total_avoided);
        assert_eq!(out.pathway[2].value, out.total_target);
        assert_eq!(out.pathway[2].measure, WaterfallMeasure::Total);
    }

    #[test]
    fn test_overflowing_rows_warn_instead_of_panicking() {
        let mut c = calc();
        c.rows = vec![EmissionFactorRow::new(
            Scope::Scope1,
            "Coal",
            "tons",
            dec!(1000000000000000),
            dec!(1000000000000000),
            Decimal::ZERO,
            "tons",
        )];
        let out = analyze_inventory(&c, &EngineConfig::default());
        assert_eq!(out.result.total_baseline, Decimal::ZERO);
        assert_eq!(out.result.total_bau, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("overflowed")));
    }

    #[test]
    fn test_idempotent() {
        let c = calc();
        let cfg = EngineConfig::default();
        assert_eq!(analyze_inventory(&c, &cfg).result, analyze_inventory(&c, &cfg).result);
    }
}
