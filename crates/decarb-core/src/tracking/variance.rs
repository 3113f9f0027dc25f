//! Actual CO2 reduction per tracking year against the planned baseline.
//!
//! Each year is recomputed from scratch from that year's actuals:
//!
//! ```text
//! co2_reduction(y) = (baseline.sp_net_before − sp_net(y)) × reference(y)
//! ```
//!
//! where the reference is the first output's actual (absolute) or the AMP
//! actual (specific). Rows without an actual count as zero.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::arith::Arith;
use crate::projects::accounting::{section_emission, EmissionTotals};
use crate::projects::record::CO2ProjectRecord;
use crate::tracking::ledger::{ActualsLedger, Section};
use crate::types::{with_metadata, AccountingConvention, ComputationOutput, Tonnes};

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingInput {
    pub project: CO2ProjectRecord,
    #[serde(default)]
    pub ledger: ActualsLedger,
}

/// Recomputed emissions and variance for one tracking year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearActuals {
    pub year: u32,
    pub input_emission: Tonnes,
    pub output_emission: Tonnes,
    pub net_emission: Tonnes,
    pub sp_net: Decimal,
    /// AMP actual (specific convention only).
    pub amp: Option<Decimal>,
    /// First output actual (absolute) or AMP actual (specific).
    pub reference: Decimal,
    pub co2_reduction: Tonnes,
    /// `co2_reduction − baseline co2_reduction`
    pub delta: Tonnes,
    /// `delta / baseline × 100`; `None` when the baseline is zero.
    pub pct_change: Option<Decimal>,
}

/// One line of the summary table. `co2_reduction` is blank for years
/// without data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSummaryRow {
    pub period: String,
    pub co2_reduction: Option<Tonnes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSummary {
    /// "Base" followed by one row per year of the life span.
    pub rows: Vec<TrackingSummaryRow>,
    pub years_with_data: usize,
    pub baseline_reduction: Tonnes,
    pub average_actual: Tonnes,
    /// `baseline × years_with_data`
    pub cumulative_baseline: Tonnes,
    pub cumulative_actual: Tonnes,
    pub cumulative_delta: Tonnes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingReport {
    pub project_id: String,
    pub convention: AccountingConvention,
    pub baseline: EmissionTotals,
    pub years: Vec<YearActuals>,
    pub summary: TrackingSummary,
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

/// Recompute one year from the ledger. Entries that point past the end of
/// the project's rows are skipped and reported in `warnings`.
pub fn year_actuals(
    project: &CO2ProjectRecord,
    baseline: &EmissionTotals,
    ledger: &ActualsLedger,
    year: u32,
    warnings: &mut Vec<String>,
    arith: &Arith,
) -> YearActuals {
    let convention = project.convention;
    let mut input_values = vec![Decimal::ZERO; project.inputs.len()];
    let mut output_values = vec![Decimal::ZERO; project.outputs.len()];

    for entry in ledger.entries_for(year) {
        let (slots, label) = match entry.section {
            Section::Input => (&mut input_values, "input"),
            Section::Output => (&mut output_values, "output"),
        };
        let Some(slot) = slots.get_mut(entry.row_index as usize) else {
            warnings.push(format!(
                "Year {year}: {label} actual for row {} ('{}') has no matching project row; skipped",
                entry.row_index, entry.material_name
            ));
            continue;
        };
        let value = match convention {
            AccountingConvention::Absolute => entry.absolute_value,
            AccountingConvention::Specific => entry.specific_value,
        };
        *slot = value.unwrap_or(Decimal::ZERO);
    }

    let amp = match convention {
        AccountingConvention::Absolute => None,
        AccountingConvention::Specific => {
            let amp = ledger.amp_for(year);
            if amp.is_none() {
                warnings.push(format!("Year {year}: no AMP actual recorded; AMP taken as zero"));
            }
            Some(amp.unwrap_or(Decimal::ZERO))
        }
    };

    let (input_emission, output_emission, reference) = match convention {
        AccountingConvention::Absolute => (
            section_emission(
                input_values.iter().zip(&project.inputs).map(|(v, r)| (*v, r.ef)),
                Decimal::ONE,
                arith,
            ),
            section_emission(
                output_values.iter().zip(&project.outputs).map(|(v, r)| (*v, r.ef)),
                Decimal::ONE,
                arith,
            ),
            output_values.first().copied().unwrap_or(Decimal::ZERO),
        ),
        AccountingConvention::Specific => {
            let amp_value = amp.unwrap_or(Decimal::ZERO);
            (
                section_emission(
                    input_values.iter().zip(&project.inputs).map(|(v, r)| (*v, r.ef)),
                    amp_value,
                    arith,
                ),
                section_emission(
                    project.outputs.iter().map(|r| (Decimal::ONE, r.ef)),
                    amp_value,
                    arith,
                ),
                amp_value,
            )
        }
    };

    let net_emission = arith.sub(input_emission, output_emission);
    let sp_net = arith.div(net_emission, reference);
    let co2_reduction = arith.mul(arith.sub(baseline.sp_net_before, sp_net), reference);
    let delta = arith.sub(co2_reduction, baseline.co2_reduction);
    let pct_change = if baseline.co2_reduction.is_zero() {
        None
    } else {
        Some(arith.div(arith.mul(delta, Decimal::ONE_HUNDRED), baseline.co2_reduction))
    };

    YearActuals {
        year,
        input_emission,
        output_emission,
        net_emission,
        sp_net,
        amp,
        reference,
        co2_reduction,
        delta,
        pct_change,
    }
}

/// Summary over years 1..=life_span.
pub fn tracking_summary(
    baseline_reduction: Tonnes,
    years: &[YearActuals],
    life_span: u32,
    arith: &Arith,
) -> TrackingSummary {
    let mut rows = vec![TrackingSummaryRow {
        period: "Base".to_string(),
        co2_reduction: Some(baseline_reduction),
    }];
    let mut actuals: Vec<Tonnes> = Vec::new();

    for year in 1..=life_span {
        let found = years.iter().find(|y| y.year == year).map(|y| y.co2_reduction);
        if let Some(v) = found {
            actuals.push(v);
        }
        rows.push(TrackingSummaryRow {
            period: format!("{year}-Year"),
            co2_reduction: found,
        });
    }

    let years_with_data = actuals.len();
    let cumulative_actual = arith.sum(actuals.iter().copied());
    let average_actual = arith.div(cumulative_actual, Decimal::from(years_with_data));
    let cumulative_baseline = arith.mul(baseline_reduction, Decimal::from(years_with_data));

    TrackingSummary {
        rows,
        years_with_data,
        baseline_reduction,
        average_actual,
        cumulative_baseline,
        cumulative_actual,
        cumulative_delta: arith.sub(cumulative_actual, cumulative_baseline),
    }
}

/// Recompute every recorded year and summarise against the baseline.
pub fn track_actuals(input: &TrackingInput) -> ComputationOutput<TrackingReport> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let arith = Arith::new();

    let mut project = input.project.clone();
    project.enforce_invariants();
    let baseline = project.baseline_totals(&arith);
    if project.emission_results.is_none() {
        warnings.push("Project has no saved emission results; baseline recomputed from its rows.".into());
    }
    if !input.ledger.project_id.is_empty() && input.ledger.project_id != project.id {
        warnings.push(format!(
            "Ledger belongs to '{}' but project is '{}'",
            input.ledger.project_id, project.id
        ));
    }

    let years: Vec<YearActuals> = input
        .ledger
        .years()
        .into_iter()
        .map(|year| year_actuals(&project, &baseline, &input.ledger, year, &mut warnings, &arith))
        .collect();

    for y in years.iter().filter(|y| y.year == 0 || y.year > project.life_span) {
        warnings.push(format!(
            "Year {} is outside the life span of {} years; excluded from the summary",
            y.year, project.life_span
        ));
    }

    let summary = tracking_summary(baseline.co2_reduction, &years, project.life_span, &arith);
    arith.warn_into(&mut warnings, "Actuals tracking");

    let output = TrackingReport {
        project_id: project.id.clone(),
        convention: project.convention,
        baseline,
        years,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Actuals variance: per-year CO2 reduction = (baseline Sp.Net before - actual Sp.Net) x reference",
        &serde_json::json!({
            "project": project.id,
            "life_span": project.life_span,
            "convention": project.convention,
        }),
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
