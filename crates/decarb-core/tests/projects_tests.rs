use decarb_core::abatement::mac::{calculate_mac, MacInput};
use decarb_core::projects::accounting::MaterialRow;
use decarb_core::projects::mapping::map_costing;
use decarb_core::projects::record::{CO2ProjectRecord, CostingRow};
use decarb_core::tracking::ledger::{ActualEntry, ActualsLedger, Section};
use decarb_core::tracking::variance::{track_actuals, TrackingInput};
use decarb_core::{AccountingConvention, EngineConfig};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Coal-fired furnace: 100 t coal → 60 t coal for a steady 40 t of steel.
fn furnace() -> CO2ProjectRecord {
    let mut coal = MaterialRow::new("Coal", "tons", dec!(2));
    coal.abs_before = dec!(100);
    coal.abs_after = dec!(60);
    let mut steel = MaterialRow::new("Steel", "tons", dec!(0.5));
    steel.abs_before = dec!(40);
    steel.abs_after = dec!(40);
    let mut record = CO2ProjectRecord {
        id: "ACM-PL-FU-FUR-2030-JD-0C1D".into(),
        project_name: "Furnace efficiency".into(),
        life_span: 4,
        inputs: vec![coal],
        outputs: vec![steel],
        ..Default::default()
    };
    record.costing[0].abs_after = dec!(1000);
    record.costing[1] = CostingRow {
        material: "OPEX-Only Fuel/Energy".into(),
        abs_before: dec!(500),
        abs_after: dec!(300),
        ..Default::default()
    };
    record.refresh();
    record
}

// ===========================================================================
// Emissions accounting
// ===========================================================================

#[test]
fn test_record_totals() {
    let totals = furnace().emission_totals();
    assert_eq!(totals.net_before, dec!(180));
    assert_eq!(totals.net_after, dec!(100));
    assert_eq!(totals.co2_reduction, dec!(80));
}

#[test]
fn test_evaluate_is_idempotent() {
    let record = furnace();
    assert_eq!(record.evaluate().result, record.evaluate().result);
}

#[test]
fn test_specific_convention_ignores_entered_outputs() {
    let mut record = furnace();
    record.convention = AccountingConvention::Specific;
    record.amp_before = dec!(100);
    record.amp_after = dec!(100);
    record.inputs[0].spec_before = dec!(1);
    record.inputs[0].spec_after = dec!(0.6);
    record.outputs[0].spec_before = dec!(40);
    record.refresh();
    assert_eq!(record.outputs[0].spec_before, Decimal::ONE);
    let totals = record.emission_results.clone().unwrap();
    // input 100 × 1 × 2 = 200, output 100 × 0.5 = 50
    assert_eq!(totals.net_before, dec!(150));
    assert_eq!(totals.net_after, dec!(70));
    assert_eq!(totals.co2_reduction, dec!(80));
}

// ===========================================================================
// Costing mapping into a MAC
// ===========================================================================

#[test]
fn test_mapping_feeds_mac() {
    let cfg = EngineConfig::default();
    let mapping = map_costing(&furnace(), &cfg).result;
    assert_eq!(mapping.before.lifetime, 4);
    assert_eq!(mapping.after.capex_own, dec!(1000));

    let mac = calculate_mac(
        &MacInput {
            before: mapping.before,
            after: mapping.after,
        },
        &cfg,
    )
    .result;
    assert_eq!(mac.figures.annual_co2_diff, dec!(80));
    assert_eq!(mac.figures.tracking_years, 4);
    assert_eq!(mac.figures.total_co2_diff, dec!(320));
    // Same capex on both sides; the after case spends 200 less a year on fuel.
    assert!(mac.figures.net_npv < Decimal::ZERO);
    assert!(mac.figures.mac < Decimal::ZERO);
}

// ===========================================================================
// Actuals tracking
// ===========================================================================

fn year(ledger: &mut ActualsLedger, y: u32, coal: Decimal, steel: Decimal) {
    let entry = |section, value| ActualEntry {
        section,
        material_name: String::new(),
        row_index: 0,
        year: y,
        absolute_value: Some(value),
        specific_value: None,
    };
    ledger.replace_year(y, vec![entry(Section::Input, coal), entry(Section::Output, steel)], None);
}

#[test]
fn test_tracking_against_plan() {
    let project = furnace();
    let mut ledger = ActualsLedger::new(project.id.clone());
    year(&mut ledger, 1, dec!(70), dec!(40));
    year(&mut ledger, 2, dec!(60), dec!(40));
    year(&mut ledger, 4, dec!(55), dec!(40));

    let report = track_actuals(&TrackingInput { project, ledger }).result;
    let reductions: Vec<Decimal> = report.years.iter().map(|y| y.co2_reduction).collect();
    assert_eq!(reductions, vec![dec!(60), dec!(80), dec!(90)]);
    assert_eq!(report.years[0].pct_change, Some(dec!(-25)));

    let s = report.summary;
    assert_eq!(s.rows.len(), 5);
    assert_eq!(s.rows[3].co2_reduction, None);
    assert_eq!(s.years_with_data, 3);
    assert_eq!(s.cumulative_baseline, dec!(240));
    assert_eq!(s.cumulative_actual, dec!(230));
    assert_eq!(s.cumulative_delta, dec!(-10));
}

#[test]
fn test_year_outside_life_span_warns() {
    let project = furnace();
    let mut ledger = ActualsLedger::new(project.id.clone());
    year(&mut ledger, 9, dec!(60), dec!(40));
    let out = track_actuals(&TrackingInput { project, ledger });
    assert_eq!(out.result.summary.years_with_data, 0);
    assert!(out.warnings.iter().any(|w| w.contains("outside the life span")));
}
