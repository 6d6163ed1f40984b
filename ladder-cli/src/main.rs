//! Ladder CLI — run and validate ladder simulations.
//!
//! Commands:
//! - `run` — execute a simulation from a TOML config file or inline flags
//! - `validate` — parse and validate a config file, print its run id

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use ladder_core::DEFAULT_DELTA_ENERGY;
use ladder_runner::{run_ensemble, save_artifacts, EnsembleResult, SimulationConfig, MAX_SEED};

#[derive(Parser)]
#[command(
    name = "ladder",
    about = "Boltzmann ladder — agents walking a ladder of energy levels"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a simulation from a TOML config file or inline flags.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Probability of staying on the rung each step (inline mode).
        #[arg(long)]
        stay: Option<f64>,

        /// Probability of moving up once leaving (inline mode).
        #[arg(long)]
        up: Option<f64>,

        /// Number of agents (inline mode).
        #[arg(long, default_value_t = 100)]
        agents: usize,

        /// Number of steps (inline mode).
        #[arg(long, default_value_t = 1000)]
        steps: u64,

        /// Energy spacing between rungs (inline mode).
        #[arg(long, default_value_t = DEFAULT_DELTA_ENERGY)]
        delta_energy: f64,

        /// Independent replicas (inline mode).
        #[arg(long, default_value_t = 1)]
        replicas: u32,

        /// Master seed. Overrides the config file's seed.
        #[arg(long, value_parser = clap::value_parser!(u64).range(..=MAX_SEED))]
        seed: Option<u64>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the summary only; write no artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Parse and validate a TOML config file.
    Validate {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            stay,
            up,
            agents,
            steps,
            delta_energy,
            replicas,
            seed,
            output_dir,
            no_save,
        } => {
            let config = match (config, stay, up) {
                (Some(path), None, None) => SimulationConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                (Some(_), _, _) => bail!("--config cannot be combined with --stay/--up"),
                (None, Some(stay), Some(up)) => SimulationConfig {
                    delta_energy,
                    replicas,
                    ..SimulationConfig::uniform(agents, stay, up, steps)
                },
                (None, _, _) => bail!("either --config or both --stay and --up are required"),
            };
            let config = SimulationConfig {
                seed: seed.or(config.seed),
                ..config
            };
            run_cmd(&config, &output_dir, no_save)
        }
        Commands::Validate { config } => validate_cmd(&config),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_cmd(config: &SimulationConfig, output_dir: &std::path::Path, no_save: bool) -> Result<()> {
    config.validate()?;
    info!(
        agents = config.agent_count(),
        steps = config.steps,
        replicas = config.replicas,
        "starting simulation"
    );

    let result = run_ensemble(config)?;
    print_summary(&result);

    if !no_save {
        let run_dir = save_artifacts(&result, output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn validate_cmd(path: &std::path::Path) -> Result<()> {
    let config = SimulationConfig::load(path).with_context(|| format!("loading {}", path.display()))?;
    println!("Config OK: {}", path.display());
    println!("Agents:         {}", config.agent_count());
    println!("Steps:          {}", config.steps);
    println!("Replicas:       {}", config.replicas);
    println!("Run ID:         {}", config.run_id());
    if config.seed.is_none() {
        println!("Seed:           unset, drawn at run time (run id will differ)");
    }
    Ok(())
}

fn print_summary(result: &EnsembleResult) {
    let config = &result.config;
    println!();
    println!("=== Ladder Simulation ===");
    println!("Run ID:         {}", result.run_id);
    println!("Seed:           {}", config.seed.unwrap_or_default());
    println!("Agents:         {}", config.agent_count());
    println!("Steps:          {} ({} burn-in)", config.steps, config.burn_in);
    println!("Replicas:       {}", result.replicas.len());
    println!("Delta Energy:   {}", config.delta_energy);
    println!();
    println!("--- Final State ---");
    for replica in &result.replicas {
        let total: usize = replica.final_counts.iter().sum();
        println!(
            "Replica {:<3}    occupancy {}, {} rungs, highest occupied E = {}",
            replica.replica, total, replica.rung_count, replica.highest_occupied_energy
        );
    }
    println!();
    println!("--- Occupation Distribution ---");
    match result.mean_energy() {
        Some(mean) => println!("Mean Energy:    {mean:.4}"),
        None => println!("Mean Energy:    n/a"),
    }
    for (i, p) in result.distribution().iter().enumerate().take(10) {
        println!("E = {:<8} {:.4}", result.histogram.energy_of(i), p);
    }
    if result.histogram.counts.len() > 10 {
        println!("... {} more rungs", result.histogram.counts.len() - 10);
    }
}
