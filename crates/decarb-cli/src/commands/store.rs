use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use decarb_core::abatement::project::AbatementProject;
use decarb_core::inventory::calculation::FuelEnergyCalculation;
use decarb_core::projects::record::CO2ProjectRecord;
use decarb_core::store::ids::{self, ProjectIdParts};
use decarb_core::store::{JsonFileStore, Record, RecordStore};
use decarb_core::strategy::portfolio::StrategyPortfolio;
use decarb_core::tracking::ledger::ActualsLedger;

use crate::commands::Context;
use crate::input;

/// Kind of saved record
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RecordKind {
    /// Fuel/energy calculation
    Calculation,
    /// Abatement (MACC) project
    AbatementProject,
    /// CO2 project (before/after material flows)
    Co2Project,
    /// Strategy portfolio
    Strategy,
    /// Actuals ledger of a CO2 project
    Actuals,
}

/// Arguments for saving a record
#[derive(Args)]
pub struct SaveArgs {
    #[arg(long, value_enum)]
    pub kind: RecordKind,
    /// Path to JSON input file (the record)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for loading or deleting one record
#[derive(Args)]
pub struct KeyArgs {
    #[arg(long, value_enum)]
    pub kind: RecordKind,
    /// Record identifier
    #[arg(long)]
    pub id: String,
}

/// Arguments for listing records
#[derive(Args)]
pub struct ListArgs {
    #[arg(long, value_enum)]
    pub kind: RecordKind,
}

fn project_parts<'a>(
    organization: &'a str,
    entity_name: &'a str,
    unit_name: &'a str,
    project_name: &'a str,
    target_year: i32,
    project_owner: &'a str,
) -> ProjectIdParts<'a> {
    ProjectIdParts {
        organization,
        entity_name,
        unit_name,
        project_name,
        target_year,
        project_owner,
    }
}

fn save_as<R: Record>(
    store: &mut JsonFileStore,
    path: Option<&str>,
    prepare: impl FnOnce(&mut R, &Context),
    ctx: &Context,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut record: R = input::read_input(path, "save")?;
    prepare(&mut record, ctx);
    let saved = store.save(&record)?;
    tracing::info!(kind = R::KIND, key = saved.key(), "saved");
    Ok(serde_json::to_value(saved)?)
}

pub fn run_save(args: SaveArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = ctx.open_store()?;
    let path = args.input.as_deref();
    match args.kind {
        RecordKind::Calculation => save_as::<FuelEnergyCalculation>(
            &mut store,
            path,
            |c, _| {
                if c.id.trim().is_empty() {
                    c.id = ids::calculation_id(&c.org_name, &c.sector, c.target_year);
                }
            },
            ctx,
        ),
        RecordKind::AbatementProject => save_as::<AbatementProject>(
            &mut store,
            path,
            |p, ctx| {
                if p.id.trim().is_empty() {
                    p.id = ids::abatement_project_id(&project_parts(
                        &p.organization,
                        &p.entity_name,
                        &p.unit_name,
                        &p.project_name,
                        p.target_year,
                        &p.project_owner,
                    ));
                }
                for warning in p.recalculate(&ctx.engine) {
                    tracing::warn!("{warning}");
                }
            },
            ctx,
        ),
        RecordKind::Co2Project => save_as::<CO2ProjectRecord>(
            &mut store,
            path,
            |p, _| {
                if p.id.trim().is_empty() {
                    p.id = ids::project_id(&project_parts(
                        &p.organization,
                        &p.entity_name,
                        &p.unit_name,
                        &p.project_name,
                        p.target_year,
                        &p.project_owner,
                    ));
                }
                p.refresh();
            },
            ctx,
        ),
        RecordKind::Strategy => save_as::<StrategyPortfolio>(
            &mut store,
            path,
            |s, _| {
                if s.id.trim().is_empty() {
                    s.id = ids::portfolio_id();
                }
            },
            ctx,
        ),
        RecordKind::Actuals => save_as::<ActualsLedger>(&mut store, path, |_, _| {}, ctx),
    }
}

fn load_as<R: Record>(store: &JsonFileStore, id: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let record: R = store.load(id)?;
    Ok(serde_json::to_value(record)?)
}

pub fn run_load(args: KeyArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ctx.open_store()?;
    match args.kind {
        RecordKind::Calculation => load_as::<FuelEnergyCalculation>(&store, &args.id),
        RecordKind::AbatementProject => load_as::<AbatementProject>(&store, &args.id),
        RecordKind::Co2Project => load_as::<CO2ProjectRecord>(&store, &args.id),
        RecordKind::Strategy => load_as::<StrategyPortfolio>(&store, &args.id),
        RecordKind::Actuals => load_as::<ActualsLedger>(&store, &args.id),
    }
}

pub fn run_list(args: ListArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ctx.open_store()?;
    let keys = match args.kind {
        RecordKind::Calculation => store.list::<FuelEnergyCalculation>()?,
        RecordKind::AbatementProject => store.list::<AbatementProject>()?,
        RecordKind::Co2Project => store.list::<CO2ProjectRecord>()?,
        RecordKind::Strategy => store.list::<StrategyPortfolio>()?,
        RecordKind::Actuals => store.list::<ActualsLedger>()?,
    };
    Ok(json!(keys))
}

pub fn run_delete(args: KeyArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = ctx.open_store()?;
    let removed = match args.kind {
        RecordKind::Calculation => store.delete::<FuelEnergyCalculation>(&args.id)?,
        RecordKind::AbatementProject => store.delete::<AbatementProject>(&args.id)?,
        RecordKind::Co2Project => store.delete::<CO2ProjectRecord>(&args.id)?,
        RecordKind::Strategy => store.delete::<StrategyPortfolio>(&args.id)?,
        RecordKind::Actuals => store.delete::<ActualsLedger>(&args.id)?,
    };
    if !removed {
        return Err(format!("no {:?} record with id '{}'", args.kind, args.id).into());
    }
    Ok(json!({ "deleted": args.id }))
}
