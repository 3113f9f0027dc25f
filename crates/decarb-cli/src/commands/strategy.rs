use clap::Args;
use serde_json::Value;

use decarb_core::abatement::project::AbatementProject;
use decarb_core::inventory::calculation::FuelEnergyCalculation;
use decarb_core::store::RecordStore;
use decarb_core::strategy::portfolio::{build_strategy_view, StrategyInput, StrategyPortfolio};

use crate::commands::Context;
use crate::input;

/// Arguments for the strategy view
#[derive(Args)]
pub struct StrategyArgs {
    /// Path to JSON input file ({"calculation": ..., "projects": [...]})
    #[arg(long)]
    pub input: Option<String>,
    /// Build the view from a saved strategy portfolio instead
    #[arg(long, conflicts_with = "input")]
    pub portfolio_id: Option<String>,
}

pub fn run_strategy(args: StrategyArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let strategy_input: StrategyInput = match args.portfolio_id {
        Some(ref id) => {
            let store = ctx.open_store()?;
            let portfolio: StrategyPortfolio = store.load(id)?;
            let calculation: FuelEnergyCalculation = store.load(&portfolio.baseline_calc_id)?;
            StrategyInput {
                calculation,
                projects: store.load_all::<AbatementProject>()?,
                selected: Some(portfolio.selected_projects),
            }
        }
        None => input::read_input(args.input.as_deref(), "strategy view")?,
    };
    let result = build_strategy_view(&strategy_input, &ctx.engine);
    Ok(serde_json::to_value(result)?)
}
