use std::fs;
use std::path::PathBuf;

use decarb_core::abatement::project::AbatementProject;
use decarb_core::inventory::calculation::FuelEnergyCalculation;
use decarb_core::projects::accounting::MaterialRow;
use decarb_core::projects::record::CO2ProjectRecord;
use decarb_core::store::ids::{calculation_id, project_id, ProjectIdParts};
use decarb_core::store::{JsonFileStore, MemoryStore, Record, RecordStore};
use decarb_core::strategy::portfolio::StrategyPortfolio;
use decarb_core::tracking::ledger::{ActualEntry, ActualsLedger, Section};
use decarb_core::{AccountingConvention, DecarbError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn temp_root(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("decarb-store-tests-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn specific_project() -> CO2ProjectRecord {
    let mut fuel = MaterialRow::new("Fuel", "GJ", dec!(0.1));
    fuel.spec_before = dec!(5);
    fuel.spec_after = dec!(3);
    let mut cement = MaterialRow::new("Cement", "t", dec!(0.02));
    cement.spec_before = dec!(4);
    CO2ProjectRecord {
        id: project_id(&ProjectIdParts {
            organization: "Acme",
            project_name: "Kiln",
            target_year: 2030,
            ..Default::default()
        }),
        inputs: vec![fuel],
        outputs: vec![cement],
        amp_before: dec!(1000),
        amp_after: dec!(1000),
        convention: AccountingConvention::Specific,
        ..Default::default()
    }
}

// ===========================================================================
// Round trips
// ===========================================================================

#[test]
fn test_file_round_trip_reproduces_totals() {
    let root = temp_root("roundtrip");
    let mut store = JsonFileStore::open(&root).unwrap();

    let mut project = specific_project();
    project.refresh();
    let saved = store.save(&project).unwrap();
    let loaded: CO2ProjectRecord = store.load(&project.id).unwrap();

    assert_eq!(loaded, saved);
    assert_eq!(loaded.emission_totals(), project.emission_totals());
    assert_eq!(loaded.emission_results.unwrap().co2_reduction, dec!(200));
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_specific_outputs_pinned_on_save() {
    let mut store = MemoryStore::new();
    let saved = store.save(&specific_project()).unwrap();
    assert_eq!(saved.outputs[0].spec_before, Decimal::ONE);
    assert_eq!(saved.outputs[0].abs_before, Decimal::ONE);
    assert!(saved.created_at.is_some());
}

#[test]
fn test_specific_outputs_pinned_on_load() {
    let mut store = MemoryStore::new();
    let project = specific_project();
    // stored without going through `save`
    store
        .put_raw(CO2ProjectRecord::KIND, &project.id, serde_json::to_value(&project).unwrap())
        .unwrap();
    let loaded: CO2ProjectRecord = store.load(&project.id).unwrap();
    assert_eq!(loaded.outputs[0].spec_before, Decimal::ONE);
    assert_eq!(loaded.outputs[0].spec_after, Decimal::ONE);
}

#[test]
fn test_save_is_full_replace() {
    let mut store = MemoryStore::new();
    let mut calc = FuelEnergyCalculation {
        id: calculation_id("Acme", "Steel", 2030),
        org_name: "Acme".into(),
        baseline_production: dec!(1000),
        ..Default::default()
    };
    let first = store.save(&calc).unwrap();
    calc.org_name = "Acme Steel".into();
    calc.baseline_production = Decimal::ZERO;
    store.save(&calc).unwrap();

    let loaded: FuelEnergyCalculation = store.load(&calc.id).unwrap();
    assert_eq!(loaded.org_name, "Acme Steel");
    assert_eq!(loaded.baseline_production, Decimal::ZERO);
    assert_eq!(store.list::<FuelEnergyCalculation>().unwrap(), vec![calc.id.clone()]);
    assert!(loaded.updated_at >= first.updated_at);
}

#[test]
fn test_keys_with_spaces_round_trip() {
    let root = temp_root("spaces");
    let mut store = JsonFileStore::open(&root).unwrap();
    let calc = FuelEnergyCalculation {
        id: "A B-STE-2030-58C679".into(),
        org_name: "A B Corp".into(),
        ..Default::default()
    };
    store.save(&calc).unwrap();
    let loaded: FuelEnergyCalculation = store.load("A B-STE-2030-58C679").unwrap();
    assert_eq!(loaded.org_name, "A B Corp");
    assert_eq!(store.list::<FuelEnergyCalculation>().unwrap(), vec!["A B-STE-2030-58C679"]);
    assert!(store.delete::<FuelEnergyCalculation>("A B-STE-2030-58C679").unwrap());
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn test_missing_and_empty_keys() {
    let mut store = MemoryStore::new();
    let err = store.load::<AbatementProject>("nope").unwrap_err();
    assert!(matches!(err, DecarbError::NotFound { .. }));
    assert!(store.find::<AbatementProject>("nope").unwrap().is_none());
    assert!(store.save(&AbatementProject::default()).is_err());
    assert!(!store.delete::<AbatementProject>("nope").unwrap());
}

#[test]
fn test_kinds_are_separate() {
    let mut store = MemoryStore::new();
    let project = AbatementProject {
        id: "X-1".into(),
        ..Default::default()
    };
    let portfolio = StrategyPortfolio {
        id: "X-1".into(),
        selected_projects: vec!["X-1".into()],
        ..Default::default()
    };
    store.save(&project).unwrap();
    store.save(&portfolio).unwrap();
    assert!(store.delete::<StrategyPortfolio>("X-1").unwrap());
    assert!(store.load::<AbatementProject>("X-1").is_ok());
}

// ===========================================================================
// Actuals ledger
// ===========================================================================

#[test]
fn test_ledger_replace_per_year() {
    let root = temp_root("ledger");
    let mut store = JsonFileStore::open(&root).unwrap();
    let entry = |year, value| ActualEntry {
        section: Section::Input,
        material_name: "Fuel".into(),
        row_index: 0,
        year,
        absolute_value: Some(value),
        specific_value: None,
    };

    let mut ledger = ActualsLedger::new("P-1");
    ledger.replace_year(1, vec![entry(1, dec!(10))], Some(dec!(900)));
    ledger.replace_year(2, vec![entry(2, dec!(11))], None);
    store.save(&ledger).unwrap();

    let mut loaded: ActualsLedger = store.load("P-1").unwrap();
    loaded.replace_year(1, vec![entry(1, dec!(12))], None);
    store.save(&loaded).unwrap();

    let reloaded: ActualsLedger = store.load("P-1").unwrap();
    assert_eq!(reloaded.entries_for(1).count(), 1);
    assert_eq!(reloaded.entries_for(1).next().unwrap().absolute_value, Some(dec!(12)));
    assert_eq!(reloaded.amp_for(1), None);
    assert_eq!(reloaded.entries_for(2).next().unwrap().absolute_value, Some(dec!(11)));
    let _ = fs::remove_dir_all(&root);
}
