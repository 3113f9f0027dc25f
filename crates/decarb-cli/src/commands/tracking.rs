use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use decarb_core::projects::record::CO2ProjectRecord;
use decarb_core::store::RecordStore;
use decarb_core::tracking::ledger::{ActualEntry, ActualsLedger};
use decarb_core::tracking::variance::{track_actuals, TrackingInput};

use crate::commands::Context;
use crate::input;

/// Arguments for actuals-vs-plan variance
#[derive(Args)]
pub struct TrackingArgs {
    /// Path to JSON input file ({"project": ..., "ledger": ...})
    #[arg(long)]
    pub input: Option<String>,
    /// Track a saved CO2 project against its saved actuals instead
    #[arg(long, conflicts_with = "input")]
    pub project_id: Option<String>,
}

/// Arguments for recording one year of actuals
#[derive(Args)]
pub struct RecordActualsArgs {
    /// Saved CO2 project the actuals belong to
    #[arg(long)]
    pub project_id: String,
    /// Tracking year (1-based)
    #[arg(long)]
    pub year: u32,
    /// Path to JSON input file ({"entries": [...], "amp_value": ...})
    #[arg(long)]
    pub input: Option<String>,
}

/// One year of actuals as read from input.
#[derive(Debug, Deserialize)]
struct YearActualsInput {
    #[serde(default)]
    entries: Vec<ActualEntry>,
    #[serde(default, deserialize_with = "decarb_core::coerce::optional_decimal")]
    amp_value: Option<Decimal>,
}

pub fn run_tracking(args: TrackingArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let tracking_input: TrackingInput = match args.project_id {
        Some(ref id) => {
            let store = ctx.open_store()?;
            let project: CO2ProjectRecord = store.load(id)?;
            let ledger = store
                .find::<ActualsLedger>(id)?
                .unwrap_or_else(|| ActualsLedger::new(id.clone()));
            TrackingInput { project, ledger }
        }
        None => input::read_input(args.input.as_deref(), "actuals tracking")?,
    };
    let result = track_actuals(&tracking_input);
    Ok(serde_json::to_value(result)?)
}

/// Replace everything recorded for one year and save the ledger.
pub fn run_record_actuals(args: RecordActualsArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    if args.year == 0 {
        return Err("--year must be 1 or later".into());
    }
    let year_input: YearActualsInput = input::read_input(args.input.as_deref(), "recording actuals")?;

    let mut store = ctx.open_store()?;
    let project: CO2ProjectRecord = store.load(&args.project_id)?;
    if args.year > project.life_span {
        tracing::warn!(
            year = args.year,
            life_span = project.life_span,
            "year is beyond the project life span"
        );
    }

    let mut ledger = store
        .find::<ActualsLedger>(&args.project_id)?
        .unwrap_or_else(|| ActualsLedger::new(args.project_id.clone()));
    ledger.replace_year(args.year, year_input.entries, year_input.amp_value);
    let saved = store.save(&ledger)?;
    tracing::info!(project = %args.project_id, year = args.year, "actuals recorded");
    Ok(serde_json::to_value(saved)?)
}
