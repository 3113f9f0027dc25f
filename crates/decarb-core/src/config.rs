use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Percent;

const UOM_OPTIONS: [&str; 13] = [
    "kg", "tons", "liters", "m³", "kWh", "MWh", "GJ", "MJ", "units", "pieces", "SCM", "KL", "KCal",
];

const ENERGY_UOM_OPTIONS: [&str; 4] = ["GJ", "MJ", "kWh", "MWh"];

/// Engine-wide settings. Every field has a default so a partial config
/// file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prefix for monetary values in summary text.
    pub currency_symbol: String,
    /// Units of measure accepted for material quantities.
    pub uom_options: Vec<String>,
    /// Units of measure accepted for energy factors.
    pub energy_uom_options: Vec<String>,
    /// Discount rate (percent) used when a scenario is derived rather than entered.
    #[serde(deserialize_with = "crate::coerce::decimal")]
    pub default_discount_rate: Percent,
    /// Project life span (years) used when a record leaves it blank.
    #[serde(deserialize_with = "crate::coerce::count")]
    pub default_life_span: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            uom_options: UOM_OPTIONS.iter().map(|s| s.to_string()).collect(),
            energy_uom_options: ENERGY_UOM_OPTIONS.iter().map(|s| s.to_string()).collect(),
            default_discount_rate: dec!(8.0),
            default_life_span: 10,
        }
    }
}

impl EngineConfig {
    pub fn is_known_uom(&self, uom: &str) -> bool {
        uom.trim().is_empty() || self.uom_options.iter().any(|u| u == uom.trim())
    }

    pub fn is_known_energy_uom(&self, uom: &str) -> bool {
        uom.trim().is_empty() || self.energy_uom_options.iter().any(|u| u == uom.trim())
    }

    /// Warning text for a unit outside the configured list, if any.
    /// Unknown units never change a calculation.
    pub fn uom_warning(&self, context: &str, uom: &str) -> Option<String> {
        if self.is_known_uom(uom) {
            None
        } else {
            Some(format!("{context}: unit '{uom}' is not in the configured unit list"))
        }
    }

    pub fn energy_uom_warning(&self, context: &str, uom: &str) -> Option<String> {
        if self.is_known_energy_uom(uom) {
            None
        } else {
            Some(format!(
                "{context}: energy unit '{uom}' is not in the configured energy unit list"
            ))
        }
    }

    /// Life span to use for a record, falling back to the configured default.
    pub fn life_span_or_default(&self, life_span: u32) -> u32 {
        if life_span == 0 {
            self.default_life_span
        } else {
            life_span
        }
    }

    pub fn discount_rate_or_default(&self, rate: Option<Percent>) -> Percent {
        rate.unwrap_or(self.default_discount_rate)
    }
}
