//! Agents — the stochastic actors that walk the ladder.
//!
//! Each step an agent makes up to two Bernoulli decisions:
//! 1. On its rung: stay (probability `stay`) or leave.
//! 2. Having left: go up (probability `up`) or down.
//!
//! The ladder only sees the `Actor` trait, so the decision rule (and its
//! random source) is opaque to the step engine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LadderError, Result};
use crate::transition::Transition;

/// Identifier used when none is supplied.
pub const DEFAULT_AGENT_ID: &str = "0";

/// Anything the ladder can ask for a move.
pub trait Actor {
    /// Human-readable identifier (not required to be unique).
    fn id(&self) -> &str;

    /// Decide this step's transition. Called exactly once per agent per step.
    fn act(&mut self) -> Transition;
}

/// Validated decision parameters for one agent.
///
/// Deserialization runs the same validation as [`AgentParams::new`], so a
/// config file cannot smuggle in a probability outside [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAgentParams")]
pub struct AgentParams {
    stay_probability: f64,
    up_probability: f64,
    id: String,
}

#[derive(Deserialize)]
struct RawAgentParams {
    stay_probability: f64,
    up_probability: f64,
    #[serde(default = "default_id")]
    id: String,
}

fn default_id() -> String {
    DEFAULT_AGENT_ID.to_string()
}

impl TryFrom<RawAgentParams> for AgentParams {
    type Error = LadderError;

    fn try_from(raw: RawAgentParams) -> Result<Self> {
        AgentParams::new(raw.stay_probability, raw.up_probability, raw.id)
    }
}

fn check_probability(name: &str, p: f64, id: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(LadderError::invalid_argument(format!(
            "cannot create agent {id}: {name} probability must lie in [0, 1], got {p}"
        )));
    }
    Ok(())
}

impl AgentParams {
    pub fn new(stay_probability: f64, up_probability: f64, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        check_probability("stay", stay_probability, &id)?;
        check_probability("up", up_probability, &id)?;
        Ok(Self {
            stay_probability,
            up_probability,
            id,
        })
    }

    pub fn stay_probability(&self) -> f64 {
        self.stay_probability
    }

    pub fn up_probability(&self) -> f64 {
        self.up_probability
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Same probabilities under a different identifier.
    pub fn renamed(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }
}

/// A random-decision agent driven by an injected random source.
#[derive(Debug, Clone)]
pub struct Agent<R = StdRng> {
    params: AgentParams,
    rng: R,
}

impl Agent<StdRng> {
    /// Agent seeded from OS entropy. Use [`Agent::seeded`] for reproducible runs.
    pub fn new(stay_probability: f64, up_probability: f64, id: impl Into<String>) -> Result<Self> {
        let params = AgentParams::new(stay_probability, up_probability, id)?;
        Ok(Self::with_rng(params, StdRng::from_entropy()))
    }

    /// Agent with a deterministic random source.
    pub fn seeded(params: AgentParams, seed: u64) -> Self {
        Self::with_rng(params, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Agent<R> {
    pub fn with_rng(params: AgentParams, rng: R) -> Self {
        Self { params, rng }
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    /// First decision: `true` to stay on the rung. Consumes one draw.
    pub fn decide_stay_or_leave(&mut self) -> bool {
        let alpha: f64 = self.rng.gen();
        alpha < self.params.stay_probability
    }

    /// Second decision: `true` to go up. Consumes one draw.
    pub fn decide_up_or_down(&mut self) -> bool {
        let alpha: f64 = self.rng.gen();
        alpha < self.params.up_probability
    }
}

impl<R: Rng> Actor for Agent<R> {
    fn id(&self) -> &str {
        &self.params.id
    }

    fn act(&mut self) -> Transition {
        if self.decide_stay_or_leave() {
            return Transition::Stay;
        }
        if self.decide_up_or_down() {
            Transition::Up
        } else {
            Transition::Down
        }
    }
}

impl<R> fmt::Display for Agent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Agent: {}", self.params.id)?;
        writeln!(f, "- stay probability = {}", self.params.stay_probability)?;
        writeln!(f, "- up probability = {}", self.params.up_probability)
    }
}
