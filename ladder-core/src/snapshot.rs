//! Read-back view of the ladder after a step.

use serde::{Deserialize, Serialize};

/// Per-rung occupant counts at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancySnapshot {
    /// Steps completed when the snapshot was taken.
    pub step: u64,
    pub delta_energy: f64,
    /// Occupant count per rung, rung 0 first.
    pub counts: Vec<usize>,
    pub total: usize,
    pub highest_occupied_energy: Option<f64>,
}

impl OccupancySnapshot {
    pub fn rung_count(&self) -> usize {
        self.counts.len()
    }

    /// Energy of rung `index`.
    pub fn energy_of(&self, index: usize) -> f64 {
        index as f64 * self.delta_energy
    }

    /// Mean energy per agent, or `None` on an empty ladder.
    pub fn mean_energy(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let weighted: f64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(i, &n)| self.energy_of(i) * n as f64)
            .sum();
        Some(weighted / self.total as f64)
    }
}
