use clap::Args;
use serde_json::Value;

use decarb_core::inventory::bau::analyze_inventory;
use decarb_core::inventory::calculation::FuelEnergyCalculation;
use decarb_core::store::RecordStore;

use crate::commands::Context;
use crate::input;

/// Arguments for the baseline / BAU / target analysis
#[derive(Args)]
pub struct InventoryArgs {
    /// Path to JSON input file (a fuel/energy calculation)
    #[arg(long)]
    pub input: Option<String>,
    /// Analyse a saved calculation instead
    #[arg(long, conflicts_with = "input")]
    pub calc_id: Option<String>,
}

pub fn run_inventory(args: InventoryArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let calc: FuelEnergyCalculation = match args.calc_id {
        Some(ref id) => ctx.open_store()?.load(id)?,
        None => input::read_input(args.input.as_deref(), "inventory analysis")?,
    };
    let result = analyze_inventory(&calc, &ctx.engine);
    Ok(serde_json::to_value(result)?)
}
