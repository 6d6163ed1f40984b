//! Ladder Core — agents, rungs, and the ladder time-evolution engine.
//!
//! This crate contains the heart of the simulation:
//! - Agents making a two-stage Bernoulli decision (stay / up / down) each step
//! - Transition symbols and the `Actor` seam the ladder consumes
//! - The rung container, grown lazily upward with a reflecting floor at energy 0
//! - The single-step advance, in which every agent acts exactly once
//! - Nested seed trees for starting agents, occupancy snapshots
//! - Deterministic RNG hierarchy for reproducible runs

pub mod agent;
pub mod error;
pub mod ladder;
pub mod rng;
pub mod rung;
pub mod seed;
pub mod snapshot;
pub mod step;
pub mod transition;

pub use agent::{Actor, Agent, AgentParams, DEFAULT_AGENT_ID};
pub use error::{LadderError, Result};
pub use ladder::{Ladder, DEFAULT_DELTA_ENERGY};
pub use rng::{ReplicaStreams, RngHierarchy};
pub use rung::{AgentId, Rung};
pub use seed::{Seed, MAX_SEED_DEPTH};
pub use snapshot::OccupancySnapshot;
pub use step::{MoveKind, Placement, StepReport};
pub use transition::Transition;
