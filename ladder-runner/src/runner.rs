//! Simulation runner — wires together config, agents, ladder, and histogram.
//!
//! Two entry points:
//! - `run_simulation()`: one replica, sequential. Used by the CLI and tests.
//! - `run_ensemble()`: every replica of a config, in parallel via rayon.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use ladder_core::{Agent, LadderError, Ladder, OccupancySnapshot, ReplicaStreams, RngHierarchy, Seed};

use crate::config::{ConfigError, RunId, SimulationConfig};
use crate::histogram::OccupationHistogram;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("ladder error: {0}")]
    Ladder(#[from] LadderError),
    #[error("replica {replica} out of range (config has {replicas})")]
    ReplicaOutOfRange { replica: u32, replicas: u32 },
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Running totals of move kinds across a replica.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTotals {
    pub stayed: u64,
    pub ascended: u64,
    pub descended: u64,
    pub reflected: u64,
    pub rungs_created: u64,
}

/// Complete result of a single replica.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub replica: u32,
    pub master_seed: u64,
    pub steps: u64,
    pub agent_count: usize,
    /// Snapshots at step 0, every `record_every` steps, and the final step.
    pub snapshots: Vec<OccupancySnapshot>,
    pub histogram: OccupationHistogram,
    pub moves: MoveTotals,
    pub final_counts: Vec<usize>,
    pub highest_occupied_energy: f64,
    pub rung_count: usize,
}

/// Merged result of every replica of one config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    /// The config as run, seed resolved.
    pub config: SimulationConfig,
    pub replicas: Vec<SimulationResult>,
    pub histogram: OccupationHistogram,
}

impl EnsembleResult {
    pub fn distribution(&self) -> Vec<f64> {
        self.histogram.distribution()
    }

    pub fn mean_energy(&self) -> Option<f64> {
        self.histogram.mean_energy()
    }

    /// Highest energy any replica reached at its final step.
    pub fn highest_occupied_energy(&self) -> f64 {
        self.replicas
            .iter()
            .map(|r| r.highest_occupied_energy)
            .fold(0.0, f64::max)
    }
}

/// Build the agents of `config` for one replica, grouped as in the config.
fn build_seed(config: &SimulationConfig, streams: &ReplicaStreams) -> Result<Seed<Agent>, RunError> {
    let mut next_index: u64 = 0;
    let mut groups = Vec::with_capacity(config.agents.len());
    for group in &config.agents {
        let params = group.params()?;
        let mut members = Vec::with_capacity(group.count);
        for _ in 0..group.count {
            let rng = streams.agent_rng(next_index);
            members.push(Agent::with_rng(params.clone(), rng));
            next_index += 1;
        }
        groups.push(Seed::flat(members));
    }
    Ok(Seed::many(groups))
}

/// Run one replica of `config` to completion.
///
/// An unset seed is drawn from entropy and reported in the result, so any
/// run can be repeated.
pub fn run_simulation(config: &SimulationConfig, replica: u32) -> Result<SimulationResult, RunError> {
    config.validate()?;
    if replica >= config.replicas {
        return Err(RunError::ReplicaOutOfRange {
            replica,
            replicas: config.replicas,
        });
    }
    let config = config.resolved();
    let master_seed = config.seed.unwrap_or_default();
    let run_id = config.run_id();
    let streams = RngHierarchy::new(master_seed, &run_id).replica(replica);

    let mut ladder: Ladder = Ladder::with_delta_energy(config.delta_energy)?;
    ladder.start(build_seed(&config, &streams)?)?;
    let agent_count = ladder.agent_count();

    let mut snapshots = vec![ladder.snapshot()];
    let mut histogram = OccupationHistogram::new(config.delta_energy);
    let mut moves = MoveTotals::default();

    for step in 1..=config.steps {
        let report = ladder.advance_one_step();
        moves.stayed += report.stayed as u64;
        moves.ascended += report.ascended as u64;
        moves.descended += report.descended as u64;
        moves.reflected += report.reflected as u64;
        moves.rungs_created += report.rungs_created as u64;

        let counts = ladder.occupancy_counts();
        debug_assert_eq!(counts.iter().sum::<usize>(), agent_count);
        if step > config.burn_in {
            histogram.record(&counts);
        }
        if step % config.record_every == 0 || step == config.steps {
            snapshots.push(ladder.snapshot());
        }
    }

    let highest_occupied_energy = ladder.highest_occupied_energy()?;
    info!(
        run_id = &run_id[..12],
        replica,
        steps = config.steps,
        agents = agent_count,
        rungs = ladder.rung_count(),
        highest_occupied_energy,
        "replica complete"
    );

    Ok(SimulationResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        replica,
        master_seed,
        steps: config.steps,
        agent_count,
        snapshots,
        histogram,
        moves,
        final_counts: ladder.occupancy_counts(),
        highest_occupied_energy,
        rung_count: ladder.rung_count(),
    })
}

/// Run every replica of `config` in parallel and merge their histograms.
pub fn run_ensemble(config: &SimulationConfig) -> Result<EnsembleResult, RunError> {
    run_ensemble_with(config, true)
}

/// Same as [`run_ensemble`], optionally on the calling thread only.
///
/// Replica seeds are hash-derived, so both modes give identical results.
pub fn run_ensemble_with(config: &SimulationConfig, parallel: bool) -> Result<EnsembleResult, RunError> {
    config.validate()?;
    let config = config.resolved();

    let replicas: Vec<SimulationResult> = if parallel {
        (0..config.replicas)
            .into_par_iter()
            .map(|r| run_simulation(&config, r))
            .collect::<Result<_, _>>()?
    } else {
        (0..config.replicas)
            .map(|r| run_simulation(&config, r))
            .collect::<Result<_, _>>()?
    };

    let mut histogram = OccupationHistogram::new(config.delta_energy);
    for result in &replicas {
        histogram.merge(&result.histogram);
    }

    let run_id = config.run_id();
    info!(
        run_id = &run_id[..12],
        replicas = replicas.len(),
        samples = histogram.samples,
        mean_energy = ?histogram.mean_energy(),
        "ensemble complete"
    );

    Ok(EnsembleResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        config,
        replicas,
        histogram,
    })
}
