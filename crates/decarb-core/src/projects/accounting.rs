//! Before/after emissions accounting for a CO2 project.
//!
//! Input rows are materials consumed, output rows are products made. Under
//! the absolute convention quantities are period totals; under the specific
//! convention they are per unit of annual material production (AMP) and
//! every output row counts as exactly one unit.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::arith::Arith;
use crate::types::{with_metadata, AccountingConvention, ComputationOutput, Tonnes};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// One material line of a CO2 project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialRow {
    #[serde(default, alias = "Material", alias = "name", alias = "Name")]
    pub material: String,
    #[serde(default, alias = "UOM", alias = "unit", alias = "Unit")]
    pub uom: String,
    /// Emission factor (tCO2e per unit).
    #[serde(
        default,
        alias = "emission_factor",
        alias = "Emission Factor (tCO₂e/unit)",
        deserialize_with = "crate::coerce::decimal"
    )]
    pub ef: Decimal,
    #[serde(
        default,
        alias = "Absolute Before",
        alias = "Abs Actual-Before",
        deserialize_with = "crate::coerce::decimal"
    )]
    pub abs_before: Decimal,
    #[serde(
        default,
        alias = "Absolute After",
        alias = "Abs Planned-After",
        deserialize_with = "crate::coerce::decimal"
    )]
    pub abs_after: Decimal,
    #[serde(
        default,
        alias = "Specific Before",
        alias = "Spec Actual-Before",
        deserialize_with = "crate::coerce::decimal"
    )]
    pub spec_before: Decimal,
    #[serde(
        default,
        alias = "Specific After",
        alias = "Spec Planned-After",
        deserialize_with = "crate::coerce::decimal"
    )]
    pub spec_after: Decimal,
}

impl MaterialRow {
    pub fn new(material: &str, uom: &str, ef: Decimal) -> Self {
        Self {
            material: material.to_string(),
            uom: uom.to_string(),
            ef,
            ..Default::default()
        }
    }
}

/// Input to an emissions accounting run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmissionAccountingInput {
    #[serde(default, alias = "input_data")]
    pub inputs: Vec<MaterialRow>,
    #[serde(default, alias = "output_data")]
    pub outputs: Vec<MaterialRow>,
    #[serde(default, alias = "calculation_method")]
    pub convention: AccountingConvention,
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub amp_before: Decimal,
    #[serde(default, deserialize_with = "crate::coerce::decimal")]
    pub amp_after: Decimal,
}

/// Before/after emission totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionTotals {
    pub input_before: Tonnes,
    pub input_after: Tonnes,
    pub output_before: Tonnes,
    pub output_after: Tonnes,
    /// `input − output`
    pub net_before: Tonnes,
    pub net_after: Tonnes,
    /// Net per unit of primary output (absolute) or AMP (specific).
    pub sp_net_before: Decimal,
    pub sp_net_after: Decimal,
    /// `(sp_net_before − sp_net_after) × reference_after`
    pub co2_reduction: Tonnes,
    /// First output row's absolute quantity, or 1.0 under specific.
    pub primary_output_before: Decimal,
    pub primary_output_after: Decimal,
    /// AMP used in the calculation (1.0 under absolute).
    pub amp_before: Decimal,
    pub amp_after: Decimal,
    pub input_change: Tonnes,
    pub output_change: Tonnes,
    pub net_change: Tonnes,
    pub sp_net_change: Decimal,
    /// `co2_reduction / net_before × 100`, zero when `net_before ≤ 0`.
    pub reduction_pct: Decimal,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Force output rows to one unit per unit of production. Returns true when
/// any value changed.
pub fn pin_specific_outputs(rows: &mut [MaterialRow]) -> bool {
    let mut changed = false;
    for row in rows.iter_mut() {
        for value in [&mut row.abs_before, &mut row.spec_before, &mut row.spec_after] {
            if *value != Decimal::ONE {
                *value = Decimal::ONE;
                changed = true;
            }
        }
    }
    changed
}

/// Emission of a section from `(quantity, ef)` pairs, scaled by `amp`.
pub fn section_emission(
    pairs: impl IntoIterator<Item = (Decimal, Decimal)>,
    amp: Decimal,
    arith: &Arith,
) -> Tonnes {
    arith.sum(
        pairs
            .into_iter()
            .map(|(qty, ef)| arith.mul(arith.mul(amp, qty), ef)),
    )
}

/// Sp.Net and CO2 reduction from section totals and reference quantities.
pub(crate) fn derive_totals(
    input_before: Tonnes,
    input_after: Tonnes,
    output_before: Tonnes,
    output_after: Tonnes,
    reference_before: Decimal,
    reference_after: Decimal,
    arith: &Arith,
) -> (Tonnes, Tonnes, Decimal, Decimal, Tonnes) {
    let net_before = arith.sub(input_before, output_before);
    let net_after = arith.sub(input_after, output_after);
    let sp_net_before = arith.div(net_before, reference_before);
    let sp_net_after = arith.div(net_after, reference_after);
    let co2_reduction = arith.mul(arith.sub(sp_net_before, sp_net_after), reference_after);
    (net_before, net_after, sp_net_before, sp_net_after, co2_reduction)
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

/// Before/after totals under the given convention. Pure; empty rows and
/// overflowing amounts give zeros. A zero denominator gives zero Sp.Net.
pub fn compute_emission_totals(
    inputs: &[MaterialRow],
    outputs: &[MaterialRow],
    convention: AccountingConvention,
    amp_before: Decimal,
    amp_after: Decimal,
) -> EmissionTotals {
    emission_totals_with(inputs, outputs, convention, amp_before, amp_after, &Arith::new())
}

/// [`compute_emission_totals`] recording overflow in `arith`.
pub fn emission_totals_with(
    inputs: &[MaterialRow],
    outputs: &[MaterialRow],
    convention: AccountingConvention,
    amp_before: Decimal,
    amp_after: Decimal,
    arith: &Arith,
) -> EmissionTotals {
    let (input_before, input_after, output_before, output_after, primary_before, primary_after, amp_b, amp_a) =
        match convention {
            AccountingConvention::Absolute => {
                let first = outputs.first();
                (
                    section_emission(inputs.iter().map(|r| (r.abs_before, r.ef)), Decimal::ONE, arith),
                    section_emission(inputs.iter().map(|r| (r.abs_after, r.ef)), Decimal::ONE, arith),
                    section_emission(outputs.iter().map(|r| (r.abs_before, r.ef)), Decimal::ONE, arith),
                    section_emission(outputs.iter().map(|r| (r.abs_after, r.ef)), Decimal::ONE, arith),
                    first.map(|r| r.abs_before).unwrap_or(Decimal::ZERO),
                    first.map(|r| r.abs_after).unwrap_or(Decimal::ZERO),
                    Decimal::ONE,
                    Decimal::ONE,
                )
            }
            AccountingConvention::Specific => {
                let primary = if outputs.is_empty() {
                    Decimal::ZERO
                } else {
                    Decimal::ONE
                };
                (
                    section_emission(inputs.iter().map(|r| (r.spec_before, r.ef)), amp_before, arith),
                    section_emission(inputs.iter().map(|r| (r.spec_after, r.ef)), amp_after, arith),
                    section_emission(outputs.iter().map(|r| (Decimal::ONE, r.ef)), amp_before, arith),
                    section_emission(outputs.iter().map(|r| (Decimal::ONE, r.ef)), amp_after, arith),
                    primary,
                    primary,
                    amp_before,
                    amp_after,
                )
            }
        };

    let (reference_before, reference_after) = match convention {
        AccountingConvention::Absolute => (primary_before, primary_after),
        AccountingConvention::Specific => (amp_b, amp_a),
    };

    let (net_before, net_after, sp_net_before, sp_net_after, co2_reduction) = derive_totals(
        input_before,
        input_after,
        output_before,
        output_after,
        reference_before,
        reference_after,
        arith,
    );

    let reduction_pct = if net_before > Decimal::ZERO {
        arith.div(arith.mul(co2_reduction, Decimal::ONE_HUNDRED), net_before)
    } else {
        Decimal::ZERO
    };

    EmissionTotals {
        input_before,
        input_after,
        output_before,
        output_after,
        net_before,
        net_after,
        sp_net_before,
        sp_net_after,
        co2_reduction,
        primary_output_before: primary_before,
        primary_output_after: primary_after,
        amp_before: amp_b,
        amp_after: amp_a,
        input_change: arith.sub(input_before, input_after),
        output_change: arith.sub(output_before, output_after),
        net_change: arith.sub(net_before, net_after),
        sp_net_change: arith.sub(sp_net_before, sp_net_after),
        reduction_pct,
    }
}

/// Envelope wrapper around [`compute_emission_totals`].
pub fn calculate_emissions(input: &EmissionAccountingInput) -> ComputationOutput<EmissionTotals> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut outputs = input.outputs.clone();
    if input.convention == AccountingConvention::Specific && pin_specific_outputs(&mut outputs) {
        warnings.push("Specific convention: output rows pinned to 1.0 per unit of production.".into());
    }

    let arith = Arith::new();
    let totals = emission_totals_with(
        &input.inputs,
        &outputs,
        input.convention,
        input.amp_before,
        input.amp_after,
        &arith,
    );
    arith.warn_into(&mut warnings, "Emissions accounting");

    match input.convention {
        AccountingConvention::Absolute if totals.primary_output_after.is_zero() => {
            warnings.push("Primary output (first output row) is zero; Sp.Net set to zero.".into());
        }
        AccountingConvention::Specific if input.amp_after.is_zero() || input.amp_before.is_zero() => {
            warnings.push("AMP is zero; Sp.Net set to zero.".into());
        }
        _ => {}
    }

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Before/after emissions accounting: net = input - output, Sp.Net = net / reference",
        input,
        warnings,
        elapsed,
        totals,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
