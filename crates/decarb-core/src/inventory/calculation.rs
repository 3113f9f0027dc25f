use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::arith::Arith;
use crate::inventory::factors::{emissions_by_scope, EmissionFactorRow};
use crate::time_value::{compound, pct_to_rate};
use crate::types::{Percent, ScopeValues};

/// A baseline fuel/energy calculation: consumption rows for the previous
/// year plus the production and reduction targets needed to project BAU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelEnergyCalculation {
    /// Opaque identifier, never parsed.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub org_name: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default, deserialize_with = "crate::coerce::year")]
    pub baseline_year: i32,
    /// Year the consumption rows were measured in.
    #[serde(default, deserialize_with = "crate::coerce::year")]
    pub previous_year: i32,
    #[serde(default, deserialize_with = "crate::coerce::year")]
    pub target_year: i32,
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub baseline_production: Decimal,
    #[serde(default, alias = "previous_year_production", deserialize_with = "crate::coerce::decimal")]
    pub previous_production: Decimal,
    /// Annual production growth (percent).
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub growth_rate: Percent,
    #[serde(default, alias = "baseline_rows")]
    pub rows: Vec<EmissionFactorRow>,
    /// Target reduction per scope (percent of baseline).
    #[serde(default, alias = "reductions_pct")]
    pub reduction_pct: ScopeValues,
    /// Official baseline-year emissions, used only when the previous year
    /// differs from the baseline year.
    #[serde(default, alias = "baseline_emissions_input")]
    pub baseline_override: Option<ScopeValues>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for FuelEnergyCalculation {
    fn default() -> Self {
        Self {
            id: String::new(),
            org_name: String::new(),
            sector: String::new(),
            baseline_year: 2024,
            previous_year: 2024,
            target_year: 2030,
            baseline_production: Decimal::ZERO,
            previous_production: Decimal::ZERO,
            growth_rate: Decimal::ZERO,
            rows: Vec::new(),
            reduction_pct: ScopeValues::default(),
            baseline_override: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Baseline emissions per scope together with where they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBaseline {
    pub by_scope: ScopeValues,
    /// True when taken from the consumption rows rather than an override.
    pub from_rows: bool,
}

impl FuelEnergyCalculation {
    /// Previous year is also the baseline year.
    pub fn same_year(&self) -> bool {
        self.previous_year == self.baseline_year
    }

    /// Years from baseline to target. Negative when the target precedes the
    /// baseline.
    pub fn horizon_years(&self) -> i64 {
        i64::from(self.target_year) - i64::from(self.baseline_year)
    }

    /// `baseline_production × (1 + g/100)^(target_year − baseline_year)`.
    ///
    /// A target before the baseline discounts instead of compounding.
    /// Overflow yields zero.
    pub fn target_production(&self) -> Decimal {
        let years = self.horizon_years();
        let periods = u32::try_from(years.unsigned_abs()).unwrap_or(u32::MAX);
        let grown = Decimal::ONE
            .checked_add(pct_to_rate(self.growth_rate))
            .and_then(|base| compound(base, periods));
        let factor = match grown {
            Some(f) if years >= 0 => f,
            Some(f) if !f.is_zero() => Decimal::ONE.checked_div(f).unwrap_or(Decimal::ZERO),
            _ => Decimal::ZERO,
        };
        self.baseline_production
            .checked_mul(factor)
            .unwrap_or(Decimal::ZERO)
    }

    /// Emissions of the consumption rows, by scope.
    pub fn previous_emissions(&self, arith: &Arith) -> ScopeValues {
        emissions_by_scope(&self.rows, arith)
    }

    /// Row sums when previous == baseline year, otherwise the explicit
    /// override (zero when absent).
    pub fn resolve_baseline(&self, arith: &Arith) -> ResolvedBaseline {
        if self.same_year() {
            ResolvedBaseline {
                by_scope: self.previous_emissions(arith),
                from_rows: true,
            }
        } else {
            ResolvedBaseline {
                by_scope: self.baseline_override.clone().unwrap_or_default(),
                from_rows: false,
            }
        }
    }
}
