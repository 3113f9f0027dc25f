use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::arith::Arith;
use crate::projects::accounting::{
    calculate_emissions, emission_totals_with, pin_specific_outputs, EmissionAccountingInput,
    EmissionTotals, MaterialRow,
};
use crate::types::{AccountingConvention, ComputationOutput};

/// Fixed labels of the first three costing rows, in order.
pub const COSTING_LABELS: [&str; 3] = [
    "CAPEX",
    "OPEX-Only Fuel/Energy",
    "OPEX-Other than Fuel/Energy",
];

/// One line of a project's costing breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostingRow {
    #[serde(default, alias = "Particular", alias = "item")]
    pub material: String,
    #[serde(default)]
    pub uom: String,
    #[serde(default, alias = "Absolute Before", deserialize_with = "crate::coerce::decimal")]
    pub abs_before: Decimal,
    #[serde(default, alias = "Absolute After", deserialize_with = "crate::coerce::decimal")]
    pub abs_after: Decimal,
    #[serde(default, alias = "Specific Before", deserialize_with = "crate::coerce::decimal")]
    pub spec_before: Decimal,
    #[serde(default, alias = "Specific After", deserialize_with = "crate::coerce::decimal")]
    pub spec_after: Decimal,
}

impl CostingRow {
    pub fn labeled(label: &str) -> Self {
        Self {
            material: label.to_string(),
            ..Default::default()
        }
    }

    /// `(before, after)` from the column that matches the convention.
    pub fn values(&self, convention: AccountingConvention) -> (Decimal, Decimal) {
        match convention {
            AccountingConvention::Absolute => (self.abs_before, self.abs_after),
            AccountingConvention::Specific => (self.spec_before, self.spec_after),
        }
    }
}

fn default_life_span() -> u32 {
    10
}

fn default_amp_uom() -> String {
    "t/tp".to_string()
}

/// A saved CO2 project: material flows before/after, costing and AMP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CO2ProjectRecord {
    /// Opaque identifier, never parsed.
    #[serde(default, alias = "project_code")]
    pub id: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub entity_name: String,
    #[serde(default)]
    pub unit_name: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default, deserialize_with = "crate::coerce::year")]
    pub base_year: i32,
    #[serde(default, deserialize_with = "crate::coerce::year")]
    pub target_year: i32,
    #[serde(default, deserialize_with = "crate::coerce::optional_date")]
    pub implementation_date: Option<NaiveDate>,
    #[serde(default = "default_life_span", deserialize_with = "crate::coerce::count")]
    pub life_span: u32,
    #[serde(default)]
    pub project_owner: String,
    #[serde(default, alias = "input_data")]
    pub inputs: Vec<MaterialRow>,
    #[serde(default, alias = "output_data")]
    pub outputs: Vec<MaterialRow>,
    #[serde(default, alias = "costing_data")]
    pub costing: Vec<CostingRow>,
    /// Annual material production before the project.
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub amp_before: Decimal,
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub amp_after: Decimal,
    #[serde(default = "default_amp_uom")]
    pub amp_uom: String,
    #[serde(default, alias = "calculation_method")]
    pub convention: AccountingConvention,
    /// Totals from the last save; the baseline for actuals tracking.
    #[serde(default, alias = "emission_results")]
    pub emission_results: Option<EmissionTotals>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for CO2ProjectRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            organization: String::new(),
            entity_name: String::new(),
            unit_name: String::new(),
            project_name: String::new(),
            base_year: 0,
            target_year: 0,
            implementation_date: None,
            life_span: default_life_span(),
            project_owner: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            costing: COSTING_LABELS.iter().map(|l| CostingRow::labeled(l)).collect(),
            amp_before: Decimal::ZERO,
            amp_after: Decimal::ZERO,
            amp_uom: default_amp_uom(),
            convention: AccountingConvention::Absolute,
            emission_results: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl CO2ProjectRecord {
    /// Pin specific-convention outputs and restore the fixed costing labels.
    /// Returns true when anything changed.
    pub fn enforce_invariants(&mut self) -> bool {
        let mut changed = false;
        if self.convention == AccountingConvention::Specific {
            changed |= pin_specific_outputs(&mut self.outputs);
        }
        while self.costing.len() < COSTING_LABELS.len() {
            self.costing.push(CostingRow::default());
            changed = true;
        }
        for (row, label) in self.costing.iter_mut().zip(COSTING_LABELS) {
            if row.material != label {
                row.material = label.to_string();
                changed = true;
            }
        }
        changed
    }

    pub fn accounting_input(&self) -> EmissionAccountingInput {
        EmissionAccountingInput {
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            convention: self.convention,
            amp_before: self.amp_before,
            amp_after: self.amp_after,
        }
    }

    /// Totals from the current rows (not the stored results).
    pub fn emission_totals(&self) -> EmissionTotals {
        self.emission_totals_with(&Arith::new())
    }

    pub fn emission_totals_with(&self, arith: &Arith) -> EmissionTotals {
        emission_totals_with(
            &self.inputs,
            &self.outputs,
            self.convention,
            self.amp_before,
            self.amp_after,
            arith,
        )
    }

    pub fn evaluate(&self) -> ComputationOutput<EmissionTotals> {
        calculate_emissions(&self.accounting_input())
    }

    /// Stored results, or a fresh calculation when none were saved.
    pub fn baseline_totals(&self, arith: &Arith) -> EmissionTotals {
        self.emission_results
            .clone()
            .unwrap_or_else(|| self.emission_totals_with(arith))
    }

    /// Enforce invariants and refresh the stored results.
    pub fn refresh(&mut self) {
        self.enforce_invariants();
        self.emission_results = Some(self.emission_totals());
    }

    /// Label used in lists: `code - name`.
    pub fn display(&self) -> String {
        if self.project_name.is_empty() {
            self.id.clone()
        } else {
            format!("{} - {}", self.id, self.project_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn specific_record() -> CO2ProjectRecord {
        let mut fuel = MaterialRow::new("Fuel", "GJ", dec!(0.1));
        fuel.spec_before = dec!(5);
        fuel.spec_after = dec!(3);
        let mut cement = MaterialRow::new("Cement", "t", dec!(0.02));
        cement.spec_before = dec!(4);
        cement.abs_before = dec!(7);
        CO2ProjectRecord {
            id: "ACM-PL-K1-KIL-2030-JD-0F3C".into(),
            project_name: "Kiln fuel switch".into(),
            inputs: vec![fuel],
            outputs: vec![cement],
            amp_before: dec!(1000),
            amp_after: dec!(1000),
            convention: AccountingConvention::Specific,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_has_fixed_costing_rows() {
        let r = CO2ProjectRecord::default();
        let labels: Vec<&str> = r.costing.iter().map(|c| c.material.as_str()).collect();
        assert_eq!(labels, COSTING_LABELS.to_vec());
        assert_eq!(r.life_span, 10);
    }

    #[test]
    fn test_enforce_invariants_pins_specific_outputs() {
        let mut r = specific_record();
        assert!(r.enforce_invariants());
        assert_eq!(r.outputs[0].abs_before, Decimal::ONE);
        assert_eq!(r.outputs[0].spec_before, Decimal::ONE);
        assert_eq!(r.outputs[0].spec_after, Decimal::ONE);
        assert!(!r.enforce_invariants());
    }

    #[test]
    fn test_absolute_outputs_untouched() {
        let mut r = specific_record();
        r.convention = AccountingConvention::Absolute;
        r.enforce_invariants();
        assert_eq!(r.outputs[0].abs_before, dec!(7));
    }

    #[test]
    fn test_costing_labels_restored() {
        let mut r = specific_record();
        r.costing = vec![CostingRow::labeled("capex?")];
        r.enforce_invariants();
        assert_eq!(r.costing.len(), 3);
        assert_eq!(r.costing[0].material, "CAPEX");
        assert_eq!(r.costing[2].material, "OPEX-Other than Fuel/Energy");
    }

    #[test]
    fn test_refresh_stores_results() {
        let mut r = specific_record();
        r.refresh();
        let totals = r.emission_results.clone().unwrap();
        assert_eq!(totals.co2_reduction, dec!(200));
        assert_eq!(r.baseline_totals(&Arith::new()), totals);
    }

    #[test]
    fn test_costing_values_follow_convention() {
        let row = CostingRow {
            material: "CAPEX".into(),
            abs_before: dec!(1),
            abs_after: dec!(2),
            spec_before: dec!(3),
            spec_after: dec!(4),
            ..Default::default()
        };
        assert_eq!(row.values(AccountingConvention::Absolute), (dec!(1), dec!(2)));
        assert_eq!(row.values(AccountingConvention::Specific), (dec!(3), dec!(4)));
    }

    #[test]
    fn test_legacy_json_shape() {
        let r: CO2ProjectRecord = serde_json::from_str(
            r#"{"project_code": "P-1", "calculation_method": "specific", "life_span": "",
                "output_data": [{"Material": "Cement", "ef": 0.02}],
                "costing_data": [{"material": "CAPEX", "abs_after": "5000"}]}"#,
        )
        .unwrap();
        assert_eq!(r.id, "P-1");
        assert_eq!(r.convention, AccountingConvention::Specific);
        assert_eq!(r.life_span, 0);
        assert_eq!(r.costing.len(), 1);
        assert_eq!(r.amp_uom, "t/tp");
    }
}
