use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::abatement::curve::MaccProject;
use crate::abatement::mac::{calculate_mac, MacFigures, MacInput, MacOutput};
use crate::abatement::scenario::InvestmentScenario;
use crate::config::EngineConfig;
use crate::types::{ComputationOutput, Money, Tonnes};

/// A material or energy line reduced or added by a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    #[serde(default)]
    pub material: String,
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub quantity: Decimal,
    #[serde(default)]
    pub uom: String,
}

impl MaterialLine {
    pub fn is_blank(&self) -> bool {
        self.material.trim().is_empty() && self.quantity.is_zero()
    }
}

/// A saved abatement project: descriptive metadata, the before/after
/// scenario pair, and the results of the last MAC calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbatementProject {
    /// Opaque identifier, never parsed.
    #[serde(default, alias = "project_id")]
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
    #[serde(default, deserialize_with = "crate::coerce::count")]
    pub life_span: u32,
    #[serde(default)]
    pub project_owner: String,
    #[serde(default)]
    pub initiative: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub country: String,
    /// Materials the project stops consuming.
    #[serde(default)]
    pub reduction: Vec<MaterialLine>,
    /// Materials the project starts consuming.
    #[serde(default)]
    pub addition: Vec<MaterialLine>,
    #[serde(default = "InvestmentScenario::before", alias = "option1")]
    pub before: InvestmentScenario,
    #[serde(default = "InvestmentScenario::after", alias = "option2")]
    pub after: InvestmentScenario,
    /// CO2 project the scenarios were mapped from, if any.
    #[serde(default)]
    pub source_co2_project: Option<String>,

    #[serde(default, alias = "calculated_npv1", deserialize_with = "crate::coerce::decimal")]
    pub npv_before: Money,
    #[serde(default, alias = "calculated_npv2", deserialize_with = "crate::coerce::decimal")]
    pub npv_after: Money,
    #[serde(default, alias = "calculated_mac", deserialize_with = "crate::coerce::decimal")]
    pub mac: Money,
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub annual_co2_diff: Tonnes,
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub total_co2_diff: Tonnes,
    #[serde(default, alias = "result")]
    pub summary: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for AbatementProject {
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
            life_span: 0,
            project_owner: String::new(),
            initiative: String::new(),
            industry: String::new(),
            country: String::new(),
            reduction: Vec::new(),
            addition: Vec::new(),
            before: InvestmentScenario::before(),
            after: InvestmentScenario::after(),
            source_co2_project: None,
            npv_before: Decimal::ZERO,
            npv_after: Decimal::ZERO,
            mac: Decimal::ZERO,
            annual_co2_diff: Decimal::ZERO,
            total_co2_diff: Decimal::ZERO,
            summary: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl AbatementProject {
    /// Name shown on charts: project name, else the id.
    pub fn display_name(&self) -> &str {
        if self.project_name.trim().is_empty() {
            &self.id
        } else {
            &self.project_name
        }
    }

    /// Run the MAC calculation on the current scenario pair.
    pub fn evaluate(&self, config: &EngineConfig) -> ComputationOutput<MacOutput> {
        let input = MacInput {
            before: self.before.clone(),
            after: self.after.clone(),
        };
        calculate_mac(&input, config)
    }

    /// Copy calculated figures into the derived fields.
    pub fn apply_results(&mut self, figures: &MacFigures, summary: &str) {
        self.npv_before = figures.npv_before;
        self.npv_after = figures.npv_after;
        self.mac = figures.mac;
        self.annual_co2_diff = figures.annual_co2_diff;
        self.total_co2_diff = figures.total_co2_diff;
        self.summary = summary.to_string();
    }

    /// Evaluate and store the results in one step. Returns the warnings.
    pub fn recalculate(&mut self, config: &EngineConfig) -> Vec<String> {
        let out = self.evaluate(config);
        self.apply_results(&out.result.figures, &out.result.summary);
        out.warnings
    }

    /// `npv_before − npv_after`, zero when the difference overflows.
    pub fn cost(&self) -> Money {
        self.npv_before
            .checked_sub(self.npv_after)
            .unwrap_or(Decimal::ZERO)
    }

    /// Curve entry built from the stored structured results.
    pub fn to_macc_project(&self) -> MaccProject {
        MaccProject {
            id: self.id.clone(),
            name: self.display_name().to_string(),
            mac: self.mac,
            co2_reduction: self.annual_co2_diff,
            cost: self.cost(),
        }
    }
}
