//! Marginal abatement cost curve (MACC).
//!
//! Projects are ordered cheapest-first by MAC. Each bar's width is the
//! project's annual abatement and bars are laid end to end, so the x-axis
//! is cumulative abatement.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::arith::Arith;
use crate::types::{with_metadata, ComputationOutput, Money, Tonnes};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// One project as it enters the curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaccProject {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub mac: Money,
    /// Annual abatement (tCO2e/yr).
    #[serde(default, alias = "annual_co2_diff", deserialize_with = "crate::coerce::decimal")]
    pub co2_reduction: Tonnes,
    /// `npv_before − npv_after`
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub cost: Money,
}

/// Colour band of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostBand {
    /// MAC < 0
    Saving,
    /// MAC = 0
    Neutral,
    /// MAC > 0
    Cost,
}

impl CostBand {
    pub fn of(mac: Money) -> Self {
        if mac < Decimal::ZERO {
            CostBand::Saving
        } else if mac.is_zero() {
            CostBand::Neutral
        } else {
            CostBand::Cost
        }
    }
}

/// One bar of the curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaccStep {
    /// Position in the input list.
    pub original_index: usize,
    pub id: String,
    pub name: String,
    pub mac: Money,
    pub co2_reduction: Tonnes,
    pub cost: Money,
    pub x_start: Tonnes,
    pub x_end: Tonnes,
    pub band: CostBand,
}

impl MaccStep {
    pub fn width(&self) -> Tonnes {
        self.x_end.checked_sub(self.x_start).unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaccStats {
    pub total_abatement: Tonnes,
    /// Unweighted mean MAC; zero for an empty curve.
    pub average_mac: Money,
    pub cost_saving_count: usize,
    pub cost_incurring_count: usize,
    /// `|Σ cost|` over projects with MAC < 0.
    pub total_savings: Money,
    /// `Σ cost` over projects with MAC > 0.
    pub total_costs: Money,
    /// `total_costs − total_savings`
    pub net_cost: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaccCurve {
    pub steps: Vec<MaccStep>,
    pub stats: MaccStats,
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

/// Sort by `(mac, original_index)` and lay bars end to end.
pub fn macc_steps(projects: &[MaccProject], arith: &Arith) -> Vec<MaccStep> {
    let mut order: Vec<usize> = (0..projects.len()).collect();
    order.sort_by(|&a, &b| projects[a].mac.cmp(&projects[b].mac).then(a.cmp(&b)));

    let mut running = Decimal::ZERO;
    order
        .into_iter()
        .map(|i| {
            let p = &projects[i];
            let x_start = running;
            running = arith.add(running, p.co2_reduction);
            MaccStep {
                original_index: i,
                id: p.id.clone(),
                name: p.name.clone(),
                mac: p.mac,
                co2_reduction: p.co2_reduction,
                cost: p.cost,
                x_start,
                x_end: running,
                band: CostBand::of(p.mac),
            }
        })
        .collect()
}

pub fn macc_stats(steps: &[MaccStep], arith: &Arith) -> MaccStats {
    let total_abatement = arith.sum(steps.iter().map(|s| s.co2_reduction));
    let average_mac = arith.div(
        arith.sum(steps.iter().map(|s| s.mac)),
        Decimal::from(steps.len()),
    );

    let saving: Vec<&MaccStep> = steps.iter().filter(|s| s.band == CostBand::Saving).collect();
    let incurring: Vec<&MaccStep> = steps.iter().filter(|s| s.band == CostBand::Cost).collect();

    let total_savings = arith.sum(saving.iter().map(|s| s.cost)).abs();
    let total_costs = arith.sum(incurring.iter().map(|s| s.cost));

    MaccStats {
        total_abatement,
        average_mac,
        cost_saving_count: saving.len(),
        cost_incurring_count: incurring.len(),
        total_savings,
        total_costs,
        net_cost: arith.sub(total_costs, total_savings),
    }
}

/// Build the curve and its statistics.
pub fn build_macc(projects: &[MaccProject]) -> ComputationOutput<MaccCurve> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if projects.is_empty() {
        warnings.push("No projects selected; curve is empty.".into());
    }
    for p in projects.iter().filter(|p| p.co2_reduction < Decimal::ZERO) {
        warnings.push(format!(
            "Project '{}' has negative annual abatement ({}); its bar runs backwards.",
            p.name, p.co2_reduction
        ));
    }

    let arith = Arith::new();
    let steps = macc_steps(projects, &arith);
    let stats = macc_stats(&steps, &arith);
    arith.warn_into(&mut warnings, "MACC");

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "MACC: projects sorted by MAC ascending, width = annual abatement",
        &serde_json::json!({ "project_count": projects.len() }),
        warnings,
        elapsed,
        MaccCurve { steps, stats },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
