use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::arith::Arith;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Percentages as entered by users (5 = 5%). Converted to `Rate` at the
/// point of use, never stored as a rate.
pub type Percent = Decimal;

/// Mass of CO2-equivalent in tonnes.
pub type Tonnes = Decimal;

/// GHG Protocol emission scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scope {
    #[default]
    #[serde(rename = "Scope 1", alias = "1", alias = "scope1", alias = "scope_1")]
    Scope1,
    #[serde(rename = "Scope 2", alias = "2", alias = "scope2", alias = "scope_2")]
    Scope2,
    #[serde(rename = "Scope 3", alias = "3", alias = "scope3", alias = "scope_3")]
    Scope3,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Scope1, Scope::Scope2, Scope::Scope3];

    pub fn label(&self) -> &'static str {
        match self {
            Scope::Scope1 => "Scope 1",
            Scope::Scope2 => "Scope 2",
            Scope::Scope3 => "Scope 3",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A value per emission scope. Missing scopes deserialize as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeValues {
    #[serde(rename = "Scope 1", alias = "1", default, deserialize_with = "crate::coerce::decimal")]
    pub scope1: Decimal,
    #[serde(rename = "Scope 2", alias = "2", default, deserialize_with = "crate::coerce::decimal")]
    pub scope2: Decimal,
    #[serde(rename = "Scope 3", alias = "3", default, deserialize_with = "crate::coerce::decimal")]
    pub scope3: Decimal,
}

impl ScopeValues {
    pub fn new(scope1: Decimal, scope2: Decimal, scope3: Decimal) -> Self {
        Self {
            scope1,
            scope2,
            scope3,
        }
    }

    pub fn get(&self, scope: Scope) -> Decimal {
        match scope {
            Scope::Scope1 => self.scope1,
            Scope::Scope2 => self.scope2,
            Scope::Scope3 => self.scope3,
        }
    }

    pub fn get_mut(&mut self, scope: Scope) -> &mut Decimal {
        match scope {
            Scope::Scope1 => &mut self.scope1,
            Scope::Scope2 => &mut self.scope2,
            Scope::Scope3 => &mut self.scope3,
        }
    }

    pub fn total(&self, arith: &Arith) -> Decimal {
        arith.sum([self.scope1, self.scope2, self.scope3])
    }

    /// Apply `f` to every scope value.
    pub fn map(&self, f: impl Fn(Scope, Decimal) -> Decimal) -> Self {
        Self {
            scope1: f(Scope::Scope1, self.scope1),
            scope2: f(Scope::Scope2, self.scope2),
            scope3: f(Scope::Scope3, self.scope3),
        }
    }
}

/// How material quantities are expressed on a project.
///
/// `Absolute` rows carry total quantities for the period. `Specific` rows
/// carry quantities per unit of annual material production (AMP).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountingConvention {
    #[default]
    Absolute,
    Specific,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
