//! `casterly` — command-line front-end for the simulation core (§6.2, §6.3).

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use casterly_core::{
    ClientAccount, EodBalance, InMemoryMarketStore, Movement, Orchestrator, RoiStrategy,
    SimulationConfig, SimulationStatus,
};

#[derive(Parser, Debug)]
#[command(name = "casterly", version, about = "Top-N trading-agent rotation simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a simulation from an input bundle to completion.
    Run {
        /// Path to a JSON `SimulationInput` bundle.
        #[arg(long)]
        input: PathBuf,
        /// Where to write the resulting `SimulationRecord` JSON.
        #[arg(long)]
        output: PathBuf,
        /// Where to write/update the run's status file.
        #[arg(long, default_value = "casterly-status.json")]
        state: PathBuf,
        #[arg(long, default_value = "unnamed simulation")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Print the last known status of a run.
    Status {
        #[arg(long, default_value = "casterly-status.json")]
        state: PathBuf,
    },
    /// Clear a run's status file so a fresh run can start from Idle.
    Reset {
        #[arg(long, default_value = "casterly-status.json")]
        state: PathBuf,
    },
}

/// On-disk input bundle: the historical market data and starting roster a
/// run needs, since the core has no ingestion layer of its own.
#[derive(Debug, Deserialize)]
struct SimulationInput {
    config: SimulationConfig,
    universe: Vec<String>,
    accounts: Vec<AccountSeed>,
    movements: Vec<Movement>,
    balances: Vec<BalanceSeed>,
}

#[derive(Debug, Deserialize)]
struct AccountSeed {
    account_id: String,
    initial_balance: f64,
}

#[derive(Debug, Deserialize)]
struct BalanceSeed {
    agent_id: String,
    date: chrono::NaiveDate,
    balance: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output,
            state,
            name,
            description,
        } => run(input, output, state, name, description),
        Commands::Status { state } => status(state),
        Commands::Reset { state } => reset(state),
    }
}

fn run(input: PathBuf, output: PathBuf, state: PathBuf, name: String, description: String) -> anyhow::Result<()> {
    let raw = fs::read_to_string(&input)?;
    let bundle: SimulationInput = serde_json::from_str(&raw)?;

    tracing::info!(agents = bundle.universe.len(), accounts = bundle.accounts.len(), "loaded simulation input");

    let mut store = InMemoryMarketStore::new();
    for movement in bundle.movements {
        store.add_movement(movement);
    }
    for seed in bundle.balances {
        store.set_eod_balance(seed.agent_id, seed.date, EodBalance { balance: seed.balance });
    }

    let accounts: Vec<ClientAccount> = bundle
        .accounts
        .into_iter()
        .map(|seed| ClientAccount::new(seed.account_id, seed.initial_balance))
        .collect();

    let mut orchestrator = Orchestrator::new(
        bundle.config,
        name,
        description,
        bundle.universe,
        accounts,
        store,
        Box::new(RoiStrategy),
    )?;

    write_status(&state, &orchestrator.status())?;

    let record = orchestrator.run(&|| false)?;

    write_status(&state, &orchestrator.status())?;
    fs::write(&output, serde_json::to_string_pretty(&record)?)?;

    tracing::info!(total_roi = record.kpis.total_roi, output = %output.display(), "simulation completed");
    Ok(())
}

fn status(state: PathBuf) -> anyhow::Result<()> {
    let status = read_status(&state)?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn reset(state: PathBuf) -> anyhow::Result<()> {
    write_status(&state, &SimulationStatus::idle())?;
    println!("state reset to idle");
    Ok(())
}

fn write_status(path: &PathBuf, status: &SimulationStatus) -> anyhow::Result<()> {
    fs::write(path, serde_json::to_string_pretty(status)?)?;
    Ok(())
}

fn read_status(path: &PathBuf) -> anyhow::Result<SimulationStatus> {
    if !path.exists() {
        return Ok(SimulationStatus::idle());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
