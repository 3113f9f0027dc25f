//! Explicit mapping from a CO2 project's costing rows to an abatement
//! scenario pair.
//!
//! `CostingSchemaV1` reads rows by position:
//!
//! | row | meaning |
//! |---|---|
//! | 0 | CAPEX |
//! | 1 | OPEX-Only Fuel/Energy |
//! | 2 | OPEX-Other than Fuel/Energy |
//!
//! Values come from the column of the project's convention. A missing row
//! maps to zero and is listed in `missing_rows`; nothing is inferred from
//! row labels.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::abatement::scenario::{CapitalSource, InvestmentScenario};
use crate::arith::Arith;
use crate::config::EngineConfig;
use crate::projects::record::{CO2ProjectRecord, COSTING_LABELS};
use crate::types::{with_metadata, AccountingConvention, ComputationOutput, Money, Tonnes};

pub const SCHEMA_VERSION: &str = "costing-v1";

/// Positions of the fixed costing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostingSchemaV1;

impl CostingSchemaV1 {
    pub const CAPEX: usize = 0;
    pub const OPEX_FUEL: usize = 1;
    pub const OPEX_OTHER: usize = 2;
}

/// Values read from the costing rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedCosting {
    pub schema_version: String,
    pub convention: AccountingConvention,
    /// After value if non-zero, else before.
    pub capex: Money,
    pub opex_fuel_before: Money,
    pub opex_fuel_after: Money,
    pub opex_other_before: Money,
    pub opex_other_after: Money,
    /// Labels of rows absent from the record.
    pub missing_rows: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostingMapping {
    pub source_project: String,
    pub costing: MappedCosting,
    /// Annual net emissions before/after, from the project's rows.
    pub net_before: Tonnes,
    pub net_after: Tonnes,
    pub life_span: u32,
    pub before: InvestmentScenario,
    pub after: InvestmentScenario,
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

/// Read the fixed costing rows. Never fails.
pub fn read_costing(record: &CO2ProjectRecord) -> MappedCosting {
    let convention = record.convention;
    let mut missing_rows = Vec::new();
    let mut row_values = |index: usize| -> (Decimal, Decimal) {
        match record.costing.get(index) {
            Some(row) => row.values(convention),
            None => {
                missing_rows.push(COSTING_LABELS[index].to_string());
                (Decimal::ZERO, Decimal::ZERO)
            }
        }
    };

    let (capex_before, capex_after) = row_values(CostingSchemaV1::CAPEX);
    let (opex_fuel_before, opex_fuel_after) = row_values(CostingSchemaV1::OPEX_FUEL);
    let (opex_other_before, opex_other_after) = row_values(CostingSchemaV1::OPEX_OTHER);

    let capex = if capex_after.is_zero() {
        capex_before
    } else {
        capex_after
    };

    MappedCosting {
        schema_version: SCHEMA_VERSION.to_string(),
        convention,
        capex,
        opex_fuel_before,
        opex_fuel_after,
        opex_other_before,
        opex_other_after,
        missing_rows,
    }
}

fn scenario(
    label: &str,
    capex: Money,
    opex_fuel: Money,
    opex_other: Money,
    annual_emissions: Tonnes,
    life_span: u32,
    discount_rate: Decimal,
) -> InvestmentScenario {
    InvestmentScenario {
        label: label.to_string(),
        capex_type: CapitalSource::Own,
        capex_own: capex,
        opex_fuel_energy_cost: opex_fuel,
        opex_regular_costs: opex_other,
        lifetime: life_span,
        emission_tracking_period: life_span,
        discount_rate,
        co2_reduction: annual_emissions,
        ..Default::default()
    }
}

/// Build the before/after scenario pair for a CO2 project.
pub fn map_costing(record: &CO2ProjectRecord, config: &EngineConfig) -> ComputationOutput<CostingMapping> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let costing = read_costing(record);
    for label in &costing.missing_rows {
        warnings.push(format!("Costing row '{label}' is missing; mapped as zero."));
    }

    let life_span = config.life_span_or_default(record.life_span);
    if record.life_span == 0 {
        warnings.push(format!("Life span not set; using {life_span} years."));
    }

    let arith = Arith::new();
    let totals = record.emission_totals_with(&arith);
    arith.warn_into(&mut warnings, "Project emissions");
    let discount_rate = config.default_discount_rate;

    let before = scenario(
        "Before Scenario",
        costing.capex,
        costing.opex_fuel_before,
        costing.opex_other_before,
        totals.net_before,
        life_span,
        discount_rate,
    );
    let after = scenario(
        "After Scenario",
        costing.capex,
        costing.opex_fuel_after,
        costing.opex_other_after,
        totals.net_after,
        life_span,
        discount_rate,
    );

    let output = CostingMapping {
        source_project: record.id.clone(),
        costing,
        net_before: totals.net_before,
        net_after: totals.net_after,
        life_span,
        before,
        after,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "CO2 project to scenario pair via costing schema v1 (row 0 CAPEX, 1 OPEX fuel, 2 OPEX other)",
        &serde_json::json!({
            "project": record.id,
            "convention": record.convention,
            "discount_rate_pct": discount_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
