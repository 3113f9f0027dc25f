mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::abatement::{MacArgs, MaccArgs, ScenarioArgs};
use commands::inventory::InventoryArgs;
use commands::projects::{MapCostingArgs, ProjectEmissionsArgs};
use commands::store::{KeyArgs, ListArgs, SaveArgs};
use commands::strategy::StrategyArgs;
use commands::tracking::{RecordActualsArgs, TrackingArgs};
use commands::Context;

/// Decarbonization planning calculations
#[derive(Parser)]
#[command(
    name = "decarb",
    version,
    about = "Decarbonization planning calculations",
    long_about = "A CLI for decarbonization planning with decimal precision. Supports \
                  emission inventories and BAU projections, scenario NPV, marginal \
                  abatement cost and MACC, CO2 project accounting, actuals tracking \
                  and strategy views, with a local JSON record store."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to a decarb.toml config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Directory of the record store (overrides the config file)
    #[arg(long, global = true)]
    store_dir: Option<String>,

    /// Log debug events to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Baseline vs business-as-usual vs target emissions
    Inventory(InventoryArgs),
    /// Cashflow schedule and NPV of one investment scenario
    Scenario(ScenarioArgs),
    /// Marginal abatement cost of a before/after scenario pair
    Mac(MacArgs),
    /// Marginal abatement cost curve
    Macc(MaccArgs),
    /// Before/after emissions of a CO2 project
    ProjectEmissions(ProjectEmissionsArgs),
    /// Map a CO2 project's costing onto a before/after scenario pair
    MapCosting(MapCostingArgs),
    /// Actual CO2 reduction per year against the plan
    Tracking(TrackingArgs),
    /// Record (replace) one year of actuals for a saved CO2 project
    RecordActuals(RecordActualsArgs),
    /// Strategy view: pathway, MACC and recommendation
    Strategy(StrategyArgs),
    /// Save a record (full replace)
    Save(SaveArgs),
    /// Load a record
    Load(KeyArgs),
    /// List record ids
    List(ListArgs),
    /// Delete a record
    Delete(KeyArgs),
    /// Write a default decarb.toml
    InitConfig,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = if matches!(cli.command, Commands::InitConfig) {
        config::CliConfig::default()
    } else {
        config::load_or_default(cli.config.as_deref()).unwrap_or_else(|e| fail(e))
    };
    let ctx = Context {
        store_dir: cli
            .store_dir
            .as_ref()
            .map(Into::into)
            .unwrap_or_else(|| cfg.store_dir()),
        engine: cfg.engine.clone(),
    };
    tracing::debug!(store_dir = %ctx.store_dir.display(), "context ready");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Inventory(args) => commands::inventory::run_inventory(args, &ctx),
        Commands::Scenario(args) => commands::abatement::run_scenario(args, &ctx),
        Commands::Mac(args) => commands::abatement::run_mac(args, &ctx),
        Commands::Macc(args) => commands::abatement::run_macc(args, &ctx),
        Commands::ProjectEmissions(args) => commands::projects::run_project_emissions(args, &ctx),
        Commands::MapCosting(args) => commands::projects::run_map_costing(args, &ctx),
        Commands::Tracking(args) => commands::tracking::run_tracking(args, &ctx),
        Commands::RecordActuals(args) => commands::tracking::run_record_actuals(args, &ctx),
        Commands::Strategy(args) => commands::strategy::run_strategy(args, &ctx),
        Commands::Save(args) => commands::store::run_save(args, &ctx),
        Commands::Load(args) => commands::store::run_load(args, &ctx),
        Commands::List(args) => commands::store::run_list(args, &ctx),
        Commands::Delete(args) => commands::store::run_delete(args, &ctx),
        Commands::InitConfig => {
            let path = Path::new(cli.config.as_deref().unwrap_or(config::DEFAULT_CONFIG_FILE));
            if path.exists() {
                fail(format!("{} already exists", path.display()));
            }
            match cfg.save(path) {
                Ok(()) => Ok(serde_json::json!({ "written": path.display().to_string() })),
                Err(e) => Err(e.into()),
            }
        }
        Commands::Version => {
            println!("decarb {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => fail(e),
    }
}
