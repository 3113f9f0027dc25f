use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::arith::Arith;
use crate::config::EngineConfig;
use crate::types::{Scope, ScopeValues, Tonnes};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// One fuel or energy consumption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactorRow {
    /// GHG scope the consumption belongs to.
    #[serde(default)]
    pub scope: Scope,
    /// Fuel, energy carrier or activity name.
    #[serde(default)]
    pub name: String,
    /// Unit of measure for `quantity`.
    #[serde(default)]
    pub uom: String,
    /// Quantity consumed in the period.
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub quantity: Decimal,
    /// Emission factor (tCO2e per unit).
    #[serde(default, alias = "ef", deserialize_with = "crate::coerce::decimal")]
    pub emission_factor: Decimal,
    /// Energy content per unit, expressed in `energy_uom`.
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub energy_factor: Decimal,
    #[serde(default)]
    pub energy_uom: String,
}

impl EmissionFactorRow {
    pub fn new(
        scope: Scope,
        name: &str,
        uom: &str,
        quantity: Decimal,
        emission_factor: Decimal,
        energy_factor: Decimal,
        energy_uom: &str,
    ) -> Self {
        Self {
            scope,
            name: name.to_string(),
            uom: uom.to_string(),
            quantity,
            emission_factor,
            energy_factor,
            energy_uom: energy_uom.to_string(),
        }
    }

    /// `quantity × emission_factor`
    pub fn emission(&self, arith: &Arith) -> Tonnes {
        arith.mul(self.quantity, self.emission_factor)
    }

    /// `quantity × energy_factor`
    pub fn energy(&self, arith: &Arith) -> Decimal {
        arith.mul(self.quantity, self.energy_factor)
    }
}

/// Emission and energy totals for one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeInventory {
    pub scope: Scope,
    pub emission: Tonnes,
    pub energy: Decimal,
    pub row_count: usize,
}

/// Per-scope inventory plus grand totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryTotals {
    pub scopes: Vec<ScopeInventory>,
    pub total_emission: Tonnes,
    pub total_energy: Decimal,
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

/// Sum row emissions by scope. Scopes without rows are zero.
pub fn emissions_by_scope(rows: &[EmissionFactorRow], arith: &Arith) -> ScopeValues {
    let mut totals = ScopeValues::default();
    for row in rows {
        let slot = totals.get_mut(row.scope);
        *slot = arith.add(*slot, row.emission(arith));
    }
    totals
}

/// Emission and energy totals per scope, in scope order.
pub fn inventory_totals(rows: &[EmissionFactorRow], arith: &Arith) -> InventoryTotals {
    let scopes: Vec<ScopeInventory> = Scope::ALL
        .iter()
        .map(|&scope| {
            let in_scope = rows.iter().filter(|r| r.scope == scope);
            let (emission, energy, row_count) = in_scope.fold(
                (Decimal::ZERO, Decimal::ZERO, 0usize),
                |(e, en, n), r| {
                    (
                        arith.add(e, r.emission(arith)),
                        arith.add(en, r.energy(arith)),
                        n + 1,
                    )
                },
            );
            ScopeInventory {
                scope,
                emission,
                energy,
                row_count,
            }
        })
        .collect();

    let total_emission = arith.sum(scopes.iter().map(|s| s.emission));
    let total_energy = arith.sum(scopes.iter().map(|s| s.energy));

    InventoryTotals {
        scopes,
        total_emission,
        total_energy,
    }
}

/// Warnings for rows whose units fall outside the configured lists.
pub fn unit_warnings(rows: &[EmissionFactorRow], config: &EngineConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let context = format!("Row {} ({})", i + 1, row.name);
        warnings.extend(config.uom_warning(&context, &row.uom));
        warnings.extend(config.energy_uom_warning(&context, &row.energy_uom));
    }
    warnings
}

/// Starter rows offered for a new calculation.
pub fn default_rows() -> Vec<EmissionFactorRow> {
    vec![
        EmissionFactorRow::new(
            Scope::Scope1,
            "Natural Gas",
            "m³",
            Decimal::ZERO,
            dec!(1.88),
            dec!(38.8),
            "GJ",
        ),
        EmissionFactorRow::new(
            Scope::Scope2,
            "Electricity",
            "kWh",
            Decimal::ZERO,
            dec!(0.5),
            dec!(0.0036),
            "GJ",
        ),
        EmissionFactorRow::new(
            Scope::Scope3,
            "Logistics",
            "tons",
            Decimal::ZERO,
            dec!(0.1),
            dec!(10.0),
            "MJ",
        ),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
