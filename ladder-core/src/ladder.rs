//! The ladder — rung container and time-evolution step.
//!
//! Rungs live in a contiguous `Vec`, bottom first, so "previous" and "next"
//! are `index - 1` and `index + 1`. Agents live in their own arena and rungs
//! hold `AgentId`s, so every agent is on exactly one rung at a time.
//!
//! Rung 0 (energy 0) always exists. Higher rungs are appended the first time
//! an agent steps up off the topmost rung, and are never removed.

use std::fmt;

use tracing::{debug, trace};

use crate::agent::{Actor, Agent};
use crate::error::{LadderError, Result};
use crate::rung::{AgentId, Rung};
use crate::seed::Seed;
use crate::snapshot::OccupancySnapshot;
use crate::step::{MoveKind, Placement, StepRecord, StepReport};
use crate::transition::Transition;

/// Default energy spacing between adjacent rungs.
pub const DEFAULT_DELTA_ENERGY: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct Ladder<A = Agent> {
    rungs: Vec<Rung>,
    agents: Vec<A>,
    /// Rung index of each agent, indexed by `AgentId`.
    positions: Vec<usize>,
    delta_energy: f64,
    steps_taken: u64,
}

impl<A: Actor> Default for Ladder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Actor> Ladder<A> {
    /// A ladder holding only the empty ground rung, spacing 1.
    pub fn new() -> Self {
        Self {
            rungs: vec![Rung::new(0.0)],
            agents: Vec::new(),
            positions: Vec::new(),
            delta_energy: DEFAULT_DELTA_ENERGY,
            steps_taken: 0,
        }
    }

    pub fn with_delta_energy(delta_energy: f64) -> Result<Self> {
        if !delta_energy.is_finite() || delta_energy <= 0.0 {
            return Err(LadderError::invalid_argument(format!(
                "delta energy must be positive and finite, got {delta_energy}"
            )));
        }
        Ok(Self {
            delta_energy,
            ..Self::new()
        })
    }

    pub fn delta_energy(&self) -> f64 {
        self.delta_energy
    }

    // ── Seeding and placement ──────────────────────────────────────────

    /// Put agents on the ground rung.
    ///
    /// Takes a single agent or any nesting of groups. The tree is flattened
    /// before anything is placed, so a failure leaves the ladder unchanged.
    pub fn start(&mut self, seed: impl Into<Seed<A>>) -> Result<Vec<AgentId>> {
        let agents = seed.into().flatten()?;
        let mut ids = Vec::with_capacity(agents.len());
        for agent in agents {
            let id = AgentId(self.agents.len());
            trace!(agent = %id, name = agent.id(), "seeded on ground rung");
            self.agents.push(agent);
            self.positions.push(0);
            self.rungs[0].push(id);
            ids.push(id);
        }
        debug!(added = ids.len(), total = self.agents.len(), "agents started");
        Ok(ids)
    }

    /// Move `agent` from rung `from` by `delta` rungs.
    ///
    /// `delta` must be -1, 0 or 1. Stepping down from rung 0 reflects the
    /// agent back onto rung 0; stepping up off the top appends a rung.
    /// All checks run before the ladder is touched.
    pub fn place(&mut self, agent: AgentId, from: usize, delta: i64) -> Result<Placement> {
        let transition = Transition::try_from(delta)?;
        self.check_rung(from)?;
        self.check_agent(agent)?;
        if !self.rungs[from].contains(agent) {
            return Err(LadderError::invalid_argument(format!(
                "agent {agent} is not on rung {from}"
            )));
        }

        self.rungs[from].remove(agent);
        Ok(self.land(agent, from, transition))
    }

    /// Put an agent that has been taken off rung `from` onto its destination.
    fn land(&mut self, agent: AgentId, from: usize, transition: Transition) -> Placement {
        let placement = match transition {
            Transition::Stay => Placement {
                rung: from,
                kind: MoveKind::Stayed,
            },
            Transition::Down => match self.previous(from) {
                Some(below) => Placement {
                    rung: below,
                    kind: MoveKind::Descended,
                },
                None => Placement {
                    rung: from,
                    kind: MoveKind::Reflected,
                },
            },
            Transition::Up => match self.next(from) {
                Some(above) => Placement {
                    rung: above,
                    kind: MoveKind::Ascended { created: false },
                },
                None => Placement {
                    rung: self.grow_from(from),
                    kind: MoveKind::Ascended { created: true },
                },
            },
        };

        self.rungs[placement.rung].push(agent);
        self.positions[agent.0] = placement.rung;
        placement
    }

    /// Append a rung one spacing above the top rung `from`; returns its index.
    fn grow_from(&mut self, from: usize) -> usize {
        debug_assert_eq!(from + 1, self.rungs.len(), "grow only from the top rung");
        let energy = self.rungs[from].energy() + self.delta_energy;
        self.rungs.push(Rung::new(energy));
        let index = self.rungs.len() - 1;
        debug!(rung = index, energy, "rung created");
        index
    }

    // ── Time evolution ─────────────────────────────────────────────────

    /// Let every agent act exactly once.
    ///
    /// Rungs are visited bottom to top. Each rung's occupants are taken as of
    /// the start of the step, so an agent that moves up onto a rung not yet
    /// visited is not asked again. The acted record is dropped when the pass
    /// ends.
    pub fn advance_one_step(&mut self) -> StepReport {
        let mut record = StepRecord::new(self.agents.len());
        let mut report = StepReport {
            step: self.steps_taken + 1,
            ..StepReport::default()
        };

        let pass: Vec<Vec<AgentId>> = self.rungs.iter_mut().map(Rung::take_occupants).collect();

        for (index, occupants) in pass.into_iter().enumerate() {
            for agent in occupants {
                debug_assert!(!record.has_acted(agent), "agent {agent} asked twice in one step");
                let transition = self.agents[agent.0].act();
                let placement = self.land(agent, index, transition);
                record.mark(agent);
                report.tally(placement);
                trace!(agent = %agent, %transition, from = index, to = placement.rung, "placed");
            }
        }

        report.acted = record.count();
        self.steps_taken += 1;
        debug!(
            step = report.step,
            acted = report.acted,
            up = report.ascended,
            down = report.descended,
            reflected = report.reflected,
            rungs = self.rungs.len(),
            "step complete"
        );
        report
    }

    /// Advance `steps` times, returning the last report (if any).
    pub fn advance(&mut self, steps: u64) -> Option<StepReport> {
        let mut last = None;
        for _ in 0..steps {
            last = Some(self.advance_one_step());
        }
        last
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Number of agents on the ladder.
    pub fn total_occupancy(&self) -> usize {
        self.rungs.iter().map(Rung::len).sum()
    }

    /// Index of the highest rung with at least one occupant.
    pub fn highest_occupied_rung(&self) -> Option<usize> {
        self.rungs.iter().rposition(|r| !r.is_empty())
    }

    /// Energy of the highest occupied rung, scanning down from the top.
    pub fn highest_occupied_energy(&self) -> Result<f64> {
        self.highest_occupied_rung()
            .map(|i| self.rungs[i].energy())
            .ok_or_else(|| LadderError::invalid_state("no rung is occupied"))
    }

    pub fn rung_count(&self) -> usize {
        self.rungs.len()
    }

    pub fn rungs(&self) -> &[Rung] {
        &self.rungs
    }

    pub fn rung(&self, index: usize) -> Result<&Rung> {
        self.check_rung(index)?;
        Ok(&self.rungs[index])
    }

    pub fn energy_of(&self, index: usize) -> Result<f64> {
        self.rung(index).map(Rung::energy)
    }

    /// Index of the rung below `index`, if both exist.
    pub fn previous(&self, index: usize) -> Option<usize> {
        (index > 0 && index < self.rungs.len()).then(|| index - 1)
    }

    /// Index of the rung above `index`, if both exist.
    pub fn next(&self, index: usize) -> Option<usize> {
        (index + 1 < self.rungs.len()).then(|| index + 1)
    }

    pub fn occupancy_counts(&self) -> Vec<usize> {
        self.rungs.iter().map(Rung::len).collect()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn agents(&self) -> &[A] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Result<&A> {
        self.check_agent(id)?;
        Ok(&self.agents[id.0])
    }

    /// Rung index currently holding `id`.
    pub fn position_of(&self, id: AgentId) -> Result<usize> {
        self.check_agent(id)?;
        Ok(self.positions[id.0])
    }

    pub fn snapshot(&self) -> OccupancySnapshot {
        OccupancySnapshot {
            step: self.steps_taken,
            delta_energy: self.delta_energy,
            counts: self.occupancy_counts(),
            total: self.total_occupancy(),
            highest_occupied_energy: self.highest_occupied_energy().ok(),
        }
    }

    fn check_rung(&self, index: usize) -> Result<()> {
        if index >= self.rungs.len() {
            return Err(LadderError::IndexOutOfRange {
                index,
                len: self.rungs.len(),
            });
        }
        Ok(())
    }

    fn check_agent(&self, id: AgentId) -> Result<()> {
        if id.0 >= self.agents.len() {
            return Err(LadderError::IndexOutOfRange {
                index: id.0,
                len: self.agents.len(),
            });
        }
        Ok(())
    }
}

impl<A> fmt::Display for Ladder<A> {
    /// One line per rung, bottom first: `E = <energy>` padded, then `[ n ]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rung in &self.rungs {
            let label = format!("E = {}", rung.energy());
            writeln!(f, "{label:<7}{rung}")?;
        }
        Ok(())
    }
}
