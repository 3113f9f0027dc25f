use clap::Args;
use serde_json::Value;

use decarb_core::abatement::curve::{build_macc, MaccProject};
use decarb_core::abatement::mac::{calculate_mac, MacInput};
use decarb_core::abatement::project::AbatementProject;
use decarb_core::abatement::scenario::{appraise_scenario, InvestmentScenario};
use decarb_core::store::RecordStore;

use crate::commands::Context;
use crate::input;

/// Arguments for a single scenario cashflow and NPV
#[derive(Args)]
pub struct ScenarioArgs {
    /// Path to JSON input file (one investment scenario)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for marginal abatement cost
#[derive(Args)]
pub struct MacArgs {
    /// Path to JSON input file ({"before": ..., "after": ...})
    #[arg(long)]
    pub input: Option<String>,
    /// Evaluate a saved abatement project instead
    #[arg(long, conflicts_with = "input")]
    pub project_id: Option<String>,
}

/// Arguments for the marginal abatement cost curve
#[derive(Args)]
pub struct MaccArgs {
    /// Path to JSON input file (array of curve entries)
    #[arg(long)]
    pub input: Option<String>,
    /// Build the curve from every saved abatement project
    #[arg(long, conflicts_with = "input")]
    pub saved: bool,
}

pub fn run_scenario(args: ScenarioArgs, _ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario: InvestmentScenario = input::read_input(args.input.as_deref(), "scenario appraisal")?;
    let result = appraise_scenario(&scenario);
    Ok(serde_json::to_value(result)?)
}

pub fn run_mac(args: MacArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let mac_input: MacInput = match args.project_id {
        Some(ref id) => {
            let project: AbatementProject = ctx.open_store()?.load(id)?;
            MacInput {
                before: project.before,
                after: project.after,
            }
        }
        None => input::read_input(args.input.as_deref(), "MAC calculation")?,
    };
    let result = calculate_mac(&mac_input, &ctx.engine);
    Ok(serde_json::to_value(result)?)
}

pub fn run_macc(args: MaccArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let projects: Vec<MaccProject> = if args.saved {
        ctx.open_store()?
            .load_all::<AbatementProject>()?
            .iter()
            .map(AbatementProject::to_macc_project)
            .collect()
    } else {
        input::read_input(args.input.as_deref(), "MACC")?
    };
    let result = build_macc(&projects);
    Ok(serde_json::to_value(result)?)
}
