use clap::Args;
use serde_json::Value;

use decarb_core::projects::accounting::{calculate_emissions, EmissionAccountingInput};
use decarb_core::projects::mapping::map_costing;
use decarb_core::projects::record::CO2ProjectRecord;
use decarb_core::store::RecordStore;

use crate::commands::Context;
use crate::input;

/// Arguments for before/after project emissions
#[derive(Args)]
pub struct ProjectEmissionsArgs {
    /// Path to JSON input file (rows, convention and AMP)
    #[arg(long)]
    pub input: Option<String>,
    /// Evaluate a saved CO2 project instead
    #[arg(long, conflicts_with = "input")]
    pub project_id: Option<String>,
}

/// Arguments for mapping a CO2 project's costing onto a scenario pair
#[derive(Args)]
pub struct MapCostingArgs {
    /// Path to JSON input file (a CO2 project record)
    #[arg(long)]
    pub input: Option<String>,
    /// Map a saved CO2 project instead
    #[arg(long, conflicts_with = "input")]
    pub project_id: Option<String>,
}

fn co2_project(
    id: Option<&str>,
    path: Option<&str>,
    ctx: &Context,
    what: &str,
) -> Result<CO2ProjectRecord, Box<dyn std::error::Error>> {
    match id {
        Some(id) => Ok(ctx.open_store()?.load(id)?),
        None => input::read_input(path, what),
    }
}

pub fn run_project_emissions(
    args: ProjectEmissionsArgs,
    ctx: &Context,
) -> Result<Value, Box<dyn std::error::Error>> {
    let accounting: EmissionAccountingInput = match args.project_id {
        Some(ref id) => co2_project(Some(id), None, ctx, "project emissions")?.accounting_input(),
        None => input::read_input(args.input.as_deref(), "project emissions")?,
    };
    let result = calculate_emissions(&accounting);
    Ok(serde_json::to_value(result)?)
}

pub fn run_map_costing(args: MapCostingArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let record = co2_project(
        args.project_id.as_deref(),
        args.input.as_deref(),
        ctx,
        "costing mapping",
    )?;
    let result = map_costing(&record, &ctx.engine);
    Ok(serde_json::to_value(result)?)
}
