use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warenav_core::{CellCoord, PlanningAlgorithm};

use warenav_manager::commands;
use warenav_manager::render::{parse_algorithm, parse_cell};

#[derive(Parser)]
#[command(name = "warenav")]
#[command(about = "warenav - incremental path planning for warehouse robots")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan one route on a scenario map
    Plan {
        /// Scenario file (.yaml, .yml or .toml)
        scenario: PathBuf,

        /// Planner to use (defaults to the scenario's params)
        #[arg(short = 'a', long = "algorithm", value_parser = parse_algorithm)]
        algorithm: Option<PlanningAlgorithm>,

        /// Start cell as x,y
        #[arg(long = "from", value_parser = parse_cell, value_name = "X,Y")]
        from: Option<CellCoord>,

        /// Goal cell as x,y
        #[arg(long = "to", value_parser = parse_cell, value_name = "X,Y")]
        to: Option<CellCoord>,

        /// Print the result as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Run all planners on the same route and compare them
    Compare {
        /// Scenario file (.yaml, .yml or .toml)
        scenario: PathBuf,

        /// Start cell as x,y
        #[arg(long = "from", value_parser = parse_cell, value_name = "X,Y")]
        from: Option<CellCoord>,

        /// Goal cell as x,y
        #[arg(long = "to", value_parser = parse_cell, value_name = "X,Y")]
        to: Option<CellCoord>,

        /// Print the result as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Run the fleet simulation
    Simulate {
        /// Scenario file (.yaml, .yml or .toml)
        scenario: PathBuf,

        /// Tick limit (defaults to max_ticks from the scenario's params)
        #[arg(short = 't', long = "ticks")]
        ticks: Option<u32>,

        /// Planner to use (defaults to the scenario's params)
        #[arg(short = 'a', long = "algorithm", value_parser = parse_algorithm)]
        algorithm: Option<PlanningAlgorithm>,

        /// Only print the final state
        #[arg(short = 'q', long = "quiet")]
        quiet: bool,

        /// Print the summary as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Print the default parameters or write them to a file
    Params {
        /// Output file (.yaml, .yml or .toml)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "warenav=debug" } else { "warenav=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run_command(cli.command) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Plan {
            scenario,
            algorithm,
            from,
            to,
            json,
        } => commands::plan::run_plan(&scenario, algorithm, from, to, json),

        Commands::Compare {
            scenario,
            from,
            to,
            json,
        } => commands::compare::run_compare(&scenario, from, to, json),

        Commands::Simulate {
            scenario,
            ticks,
            algorithm,
            quiet,
            json,
        } => commands::simulate::run_simulate(&scenario, algorithm, ticks, quiet, json),

        Commands::Params { output } => commands::params::run_params(output.as_deref()),
    }
}
