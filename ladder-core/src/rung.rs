use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an agent in the ladder's agent arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub usize);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One energy level of the ladder and the agents currently on it.
///
/// Occupant order carries no meaning; it is the order agents arrived in.
#[derive(Debug, Clone, PartialEq)]
pub struct Rung {
    energy: f64,
    occupants: Vec<AgentId>,
}

impl Rung {
    pub(crate) fn new(energy: f64) -> Self {
        Self {
            energy,
            occupants: Vec::new(),
        }
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn occupants(&self) -> &[AgentId] {
        &self.occupants
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.occupants.contains(&agent)
    }

    pub(crate) fn push(&mut self, agent: AgentId) {
        self.occupants.push(agent);
    }

    /// Remove `agent`, returning whether it was present.
    pub(crate) fn remove(&mut self, agent: AgentId) -> bool {
        match self.occupants.iter().position(|&a| a == agent) {
            Some(pos) => {
                self.occupants.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_occupants(&mut self) -> Vec<AgentId> {
        std::mem::take(&mut self.occupants)
    }
}

impl fmt::Display for Rung {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {} ]", self.occupants.len())
    }
}
