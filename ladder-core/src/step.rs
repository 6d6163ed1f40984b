//! Per-step bookkeeping.
//!
//! `StepRecord` is the turn-taking record for one pass over the ladder: a bit
//! per agent, created at the start of `advance_one_step` and dropped at its
//! end. Nothing about "has this agent acted" outlives a step.

use serde::{Deserialize, Serialize};

use crate::rung::AgentId;

#[derive(Debug, Clone)]
pub(crate) struct StepRecord {
    acted: Vec<bool>,
    count: usize,
}

impl StepRecord {
    pub(crate) fn new(agents: usize) -> Self {
        Self {
            acted: vec![false; agents],
            count: 0,
        }
    }

    pub(crate) fn has_acted(&self, agent: AgentId) -> bool {
        self.acted[agent.0]
    }

    pub(crate) fn mark(&mut self, agent: AgentId) {
        if !self.acted[agent.0] {
            self.acted[agent.0] = true;
            self.count += 1;
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }
}

/// Where `Ladder::place` put an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Destination rung index.
    pub rung: usize,
    pub kind: MoveKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    Stayed,
    /// Moved up a rung; `created` if that rung had to be appended.
    Ascended { created: bool },
    Descended,
    /// Tried to go below rung 0 and stayed put.
    Reflected,
}

/// Summary of one `advance_one_step` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// 1-based index of the step just completed.
    pub step: u64,
    pub acted: usize,
    pub stayed: usize,
    pub ascended: usize,
    pub descended: usize,
    pub reflected: usize,
    pub rungs_created: usize,
}

impl StepReport {
    pub(crate) fn tally(&mut self, placement: Placement) {
        match placement.kind {
            MoveKind::Stayed => self.stayed += 1,
            MoveKind::Ascended { created } => {
                self.ascended += 1;
                if created {
                    self.rungs_created += 1;
                }
            }
            MoveKind::Descended => self.descended += 1,
            MoveKind::Reflected => self.reflected += 1,
        }
    }

    /// Agents whose rung changed this step.
    pub fn moved(&self) -> usize {
        self.ascended + self.descended
    }
}
