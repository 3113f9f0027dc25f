//! Strategy view: a fuel/energy baseline combined with a portfolio of
//! abatement projects.
//!
//! ```text
//! planned reduction = Σ_scope baseline × pct/100
//! achieved          = Σ annual_co2_diff of selected projects
//! remaining         = baseline − achieved
//! final remaining   = BAU − achieved
//! ```
//!
//! Project abatement is read from the structured `annual_co2_diff` field,
//! never from the summary text.

use std::time::Instant;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::abatement::curve::{macc_stats, macc_steps, MaccCurve, MaccProject};
use crate::abatement::project::AbatementProject;
use crate::arith::Arith;
use crate::config::EngineConfig;
use crate::inventory::bau::{analyze_inventory, InventoryAnalysis, WaterfallMeasure, WaterfallStep};
use crate::inventory::calculation::FuelEnergyCalculation;
use crate::types::{with_metadata, ComputationOutput, Percent, Scope, Tonnes};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// A named selection of saved abatement projects tied to one baseline
/// calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyPortfolio {
    /// Opaque identifier, never parsed.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub sector: String,
    /// Id of the fuel/energy calculation supplying the baseline.
    #[serde(default, alias = "calculation_id")]
    pub baseline_calc_id: String,
    /// Abatement project ids, in display order.
    #[serde(default, alias = "project_ids")]
    pub selected_projects: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StrategyPortfolio {
    /// Pick the selected projects out of `available`, in selection order.
    /// Returns the ids that could not be found alongside.
    pub fn select<'a>(&self, available: &'a [AbatementProject]) -> (Vec<&'a AbatementProject>, Vec<String>) {
        let mut picked = Vec::new();
        let mut missing = Vec::new();
        for id in &self.selected_projects {
            match available.iter().find(|p| &p.id == id) {
                Some(p) => picked.push(p),
                None => missing.push(id.clone()),
            }
        }
        (picked, missing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInput {
    pub calculation: FuelEnergyCalculation,
    /// Abatement projects to draw from.
    #[serde(default)]
    pub projects: Vec<AbatementProject>,
    /// Restrict to these ids (all projects when absent).
    #[serde(default)]
    pub selected: Option<Vec<String>>,
}

/// Closing assessment of a strategy, by share of baseline abated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// ≥ 50%
    Outstanding,
    /// ≥ 30%
    Strong,
    AddMoreProjects,
}

impl Recommendation {
    pub fn for_achieved(achieved_pct: Percent) -> Self {
        if achieved_pct >= Decimal::from(50) {
            Recommendation::Outstanding
        } else if achieved_pct >= Decimal::from(30) {
            Recommendation::Strong
        } else {
            Recommendation::AddMoreProjects
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::Outstanding => "Outstanding! At least 50% of baseline emissions abated.",
            Recommendation::Strong => "Strong progress toward decarbonization targets.",
            Recommendation::AddMoreProjects => "Consider adding more projects to meet your reduction goals.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetrics {
    pub baseline_emission: Tonnes,
    pub previous_emission: Tonnes,
    /// Σ_scope baseline × pct/100
    pub planned_reduction: Tonnes,
    pub bau_emission: Tonnes,
    /// Σ annual CO2 diff of the selected projects.
    pub macc_achieved: Tonnes,
    /// `baseline − achieved`
    pub remaining_after_macc: Tonnes,
    /// `achieved / baseline × 100`; zero when baseline ≤ 0.
    pub achieved_pct: Percent,
    /// `BAU − achieved`
    pub final_remaining: Tonnes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyView {
    pub metrics: StrategyMetrics,
    pub pathway: Vec<WaterfallStep>,
    pub macc: MaccCurve,
    /// Selected projects with MAC < 0.
    pub cost_saving_projects: Vec<String>,
    pub recommendation: Recommendation,
    pub recommendation_text: String,
    pub inventory: InventoryAnalysis,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `Σ_scope baseline × pct/100`
pub fn planned_reduction(
    calc: &FuelEnergyCalculation,
    analysis: &InventoryAnalysis,
    arith: &Arith,
) -> Tonnes {
    arith.sum(Scope::ALL.iter().map(|&s| {
        arith.div(
            arith.mul(analysis.baseline.get(s), calc.reduction_pct.get(s)),
            Decimal::ONE_HUNDRED,
        )
    }))
}

/// Baseline → previous → BAU → one bar per project → final remaining.
pub fn strategy_pathway(
    calc: &FuelEnergyCalculation,
    metrics: &StrategyMetrics,
    projects: &[MaccProject],
    arith: &Arith,
) -> Vec<WaterfallStep> {
    let mut steps = vec![
        WaterfallStep::new(
            format!("Baseline (Year {})", calc.baseline_year),
            metrics.baseline_emission,
            WaterfallMeasure::Absolute,
        ),
        WaterfallStep::new(
            format!("Drop to {}", calc.previous_year),
            arith.sub(metrics.previous_emission, metrics.baseline_emission),
            WaterfallMeasure::Relative,
        ),
        WaterfallStep::new(
            format!("Previous Year ({})", calc.previous_year),
            metrics.previous_emission,
            WaterfallMeasure::Total,
        ),
        WaterfallStep::new(
            "Growth to BAU",
            arith.sub(metrics.bau_emission, metrics.previous_emission),
            WaterfallMeasure::Relative,
        ),
        WaterfallStep::new(
            format!("Business-As-Usual ({})", calc.target_year),
            metrics.bau_emission,
            WaterfallMeasure::Total,
        ),
    ];
    steps.extend(projects.iter().map(|p| {
        WaterfallStep::new(
            format!("{} (Reduction)", p.name),
            -p.co2_reduction,
            WaterfallMeasure::Relative,
        )
    }));
    steps.push(WaterfallStep::new(
        "Final Remaining (After MACC)",
        metrics.final_remaining,
        WaterfallMeasure::Total,
    ));
    steps
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

pub fn build_strategy_view(input: &StrategyInput, config: &EngineConfig) -> ComputationOutput<StrategyView> {
    let start = Instant::now();

    let analysis_out = analyze_inventory(&input.calculation, config);
    let mut warnings = analysis_out.warnings;
    let analysis = analysis_out.result;

    let selected: Vec<&AbatementProject> = match &input.selected {
        None => input.projects.iter().collect(),
        Some(ids) => {
            let portfolio = StrategyPortfolio {
                selected_projects: ids.clone(),
                ..Default::default()
            };
            let (picked, missing) = portfolio.select(&input.projects);
            for id in missing {
                warnings.push(format!("Selected project '{id}' not found; skipped."));
            }
            picked
        }
    };
    if selected.is_empty() {
        warnings.push("No projects selected; nothing is abated.".into());
    }

    let macc_projects: Vec<MaccProject> = selected.iter().map(|p| p.to_macc_project()).collect();
    let arith = Arith::new();
    let macc_achieved = arith.sum(macc_projects.iter().map(|p| p.co2_reduction));

    let baseline_emission = analysis.total_baseline;
    let achieved_pct = if baseline_emission > Decimal::ZERO {
        arith.div(arith.mul(macc_achieved, Decimal::ONE_HUNDRED), baseline_emission)
    } else {
        Decimal::ZERO
    };

    let metrics = StrategyMetrics {
        baseline_emission,
        previous_emission: analysis.total_previous,
        planned_reduction: planned_reduction(&input.calculation, &analysis, &arith),
        bau_emission: analysis.total_bau,
        macc_achieved,
        remaining_after_macc: arith.sub(baseline_emission, macc_achieved),
        achieved_pct,
        final_remaining: arith.sub(analysis.total_bau, macc_achieved),
    };

    let pathway = strategy_pathway(&input.calculation, &metrics, &macc_projects, &arith);
    let steps = macc_steps(&macc_projects, &arith);
    let stats = macc_stats(&steps, &arith);
    arith.warn_into(&mut warnings, "Strategy");
    let cost_saving_projects = macc_projects
        .iter()
        .filter(|p| p.mac < Decimal::ZERO)
        .map(|p| p.name.clone())
        .collect();

    let recommendation = Recommendation::for_achieved(achieved_pct);
    let output = StrategyView {
        metrics,
        pathway,
        macc: MaccCurve { steps, stats },
        cost_saving_projects,
        recommendation,
        recommendation_text: recommendation.message().to_string(),
        inventory: analysis,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Strategy: baseline/BAU pathway less selected project abatement, MACC ordered by MAC",
        &serde_json::json!({
            "calculation": input.calculation.id,
            "project_count": selected.len(),
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
    use crate::types::ScopeValues;
    use rust_decimal_macros::dec;

    fn calc() -> FuelEnergyCalculation {
        FuelEnergyCalculation {
            id: "ACM-STE-2030-1A2B3C".into(),
            baseline_year: 2020,
            previous_year: 2020,
            target_year: 2030,
            baseline_production: dec!(1000),
            previous_production: dec!(1000),
            rows: vec![
                EmissionFactorRow::new(Scope::Scope1, "Coal", "tons", dec!(100), dec!(10), dec!(25), "GJ"),
                EmissionFactorRow::new(Scope::Scope2, "Electricity", "kWh", dec!(1000), dec!(0.5), dec!(0.0036), "GJ"),
            ],
            reduction_pct: ScopeValues::new(dec!(20), dec!(50), Decimal::ZERO),
            ..Default::default()
        }
    }

    fn project(id: &str, mac: Decimal, annual: Decimal) -> AbatementProject {
        AbatementProject {
            id: id.into(),
            project_name: format!("Project {id}"),
            mac,
            annual_co2_diff: annual,
            ..Default::default()
        }
    }

    fn input() -> StrategyInput {
        StrategyInput {
            calculation: calc(),
            projects: vec![project("B", dec!(25), dec!(450)), project("A", dec!(-10), dec!(300))],
            selected: None,
        }
    }

    #[test]
    fn test_metrics() {
        let m = build_strategy_view(&input(), &EngineConfig::default()).result.metrics;
        assert_eq!(m.baseline_emission, dec!(1500));
        assert_eq!(m.previous_emission, dec!(1500));
        assert_eq!(m.planned_reduction, dec!(450));
        assert_eq!(m.bau_emission, dec!(1500));
        assert_eq!(m.macc_achieved, dec!(750));
        assert_eq!(m.remaining_after_macc, dec!(750));
        assert_eq!(m.achieved_pct, dec!(50));
        assert_eq!(m.final_remaining, dec!(750));
    }

    #[test]
    fn test_pathway_and_curve() {
        let view = build_strategy_view(&input(), &EngineConfig::default()).result;
        assert_eq!(view.pathway.len(), 8);
        assert_eq!(view.pathway[0].label, "Baseline (Year 2020)");
        assert_eq!(view.pathway[5].value, dec!(-450));
        assert_eq!(view.pathway[7].measure, WaterfallMeasure::Total);
        assert_eq!(view.pathway[7].value, dec!(750));
        assert_eq!(view.macc.steps[0].id, "A");
        assert_eq!(view.cost_saving_projects, vec!["Project A"]);
        assert_eq!(view.recommendation, Recommendation::Outstanding);
    }

    #[test]
    fn test_selection_and_missing_ids() {
        let mut i = input();
        i.selected = Some(vec!["A".into(), "Z".into()]);
        let out = build_strategy_view(&i, &EngineConfig::default());
        assert_eq!(out.result.metrics.macc_achieved, dec!(300));
        assert_eq!(out.result.recommendation, Recommendation::AddMoreProjects);
        assert!(out.warnings.iter().any(|w| w.contains("'Z'")));
    }

    #[test]
    fn test_zero_baseline_gives_zero_pct() {
        let mut i = input();
        i.calculation.rows.clear();
        let m = build_strategy_view(&i, &EngineConfig::default()).result.metrics;
        assert_eq!(m.achieved_pct, Decimal::ZERO);
        assert_eq!(m.remaining_after_macc, dec!(-750));
    }

    #[test]
    fn test_recommendation_tiers() {
        assert_eq!(Recommendation::for_achieved(dec!(30)), Recommendation::Strong);
        assert_eq!(Recommendation::for_achieved(dec!(29.9)), Recommendation::AddMoreProjects);
        assert_eq!(Recommendation::for_achieved(dec!(75)), Recommendation::Outstanding);
    }

    #[test]
    fn test_overflowing_abatement_warns() {
        let mut i = input();
        i.projects = vec![project("A", dec!(-10), Decimal::MAX), project("B", dec!(5), Decimal::MAX)];
        let out = build_strategy_view(&i, &EngineConfig::default());
        assert_eq!(out.result.metrics.macc_achieved, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.starts_with("Strategy") && w.contains("overflowed")));
    }
}
