use napi::Result as NapiResult;
use napi_derive::napi;

use decarb_core::EngineConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Engine settings from an optional JSON string; defaults when absent.
fn engine_config(config_json: Option<String>) -> NapiResult<EngineConfig> {
    match config_json {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(&json).map_err(to_napi_error),
        _ => Ok(EngineConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_inventory(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: decarb_core::inventory::calculation::FuelEnergyCalculation =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = engine_config(config_json)?;
    let output = decarb_core::inventory::bau::analyze_inventory(&input, &config);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Abatement
// ---------------------------------------------------------------------------

#[napi]
pub fn appraise_scenario(input_json: String) -> NapiResult<String> {
    let input: decarb_core::abatement::scenario::InvestmentScenario =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = decarb_core::abatement::scenario::appraise_scenario(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_mac(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: decarb_core::abatement::mac::MacInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = engine_config(config_json)?;
    let output = decarb_core::abatement::mac::calculate_mac(&input, &config);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn parse_mac_summary(summary: String) -> NapiResult<String> {
    let parsed = decarb_core::abatement::mac::parse_summary_text(&summary);
    serde_json::to_string(&parsed).map_err(to_napi_error)
}

#[napi]
pub fn build_macc(input_json: String) -> NapiResult<String> {
    let input: Vec<decarb_core::abatement::curve::MaccProject> =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = decarb_core::abatement::curve::build_macc(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// CO2 projects
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_project_emissions(input_json: String) -> NapiResult<String> {
    let input: decarb_core::projects::accounting::EmissionAccountingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = decarb_core::projects::accounting::calculate_emissions(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn map_costing(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let mut record: decarb_core::projects::record::CO2ProjectRecord =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    record.enforce_invariants();
    let config = engine_config(config_json)?;
    let output = decarb_core::projects::mapping::map_costing(&record, &config);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tracking and strategy
// ---------------------------------------------------------------------------

#[napi]
pub fn track_actuals(input_json: String) -> NapiResult<String> {
    let input: decarb_core::tracking::variance::TrackingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = decarb_core::tracking::variance::track_actuals(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_strategy_view(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: decarb_core::strategy::portfolio::StrategyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = engine_config(config_json)?;
    let output = decarb_core::strategy::portfolio::build_strategy_view(&input, &config);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_calculation_id(org_name: String, sector: String, target_year: i32) -> String {
    decarb_core::store::ids::calculation_id(&org_name, &sector, target_year)
}
