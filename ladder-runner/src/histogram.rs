//! Time-averaged occupation histogram.
//!
//! Every recorded step adds each rung's occupant count to a running tally.
//! Normalizing the tally gives the empirical probability of finding an agent
//! at each energy level, which is what the equilibrium comparison is made on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupationHistogram {
    pub delta_energy: f64,
    /// Summed occupant counts per rung, rung 0 first.
    pub counts: Vec<u64>,
    /// Number of steps recorded.
    pub samples: u64,
}

impl OccupationHistogram {
    pub fn new(delta_energy: f64) -> Self {
        Self {
            delta_energy,
            counts: Vec::new(),
            samples: 0,
        }
    }

    /// Add one step's per-rung counts.
    pub fn record(&mut self, occupancy: &[usize]) {
        if self.counts.len() < occupancy.len() {
            self.counts.resize(occupancy.len(), 0);
        }
        for (slot, &n) in self.counts.iter_mut().zip(occupancy) {
            *slot += n as u64;
        }
        self.samples += 1;
    }

    /// Fold another histogram (another replica) into this one.
    ///
    /// Both must share the same rung spacing.
    pub fn merge(&mut self, other: &OccupationHistogram) {
        debug_assert_eq!(self.delta_energy, other.delta_energy);
        if self.counts.len() < other.counts.len() {
            self.counts.resize(other.counts.len(), 0);
        }
        for (slot, &n) in self.counts.iter_mut().zip(&other.counts) {
            *slot += n;
        }
        self.samples += other.samples;
    }

    /// Agent-steps recorded.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn energy_of(&self, index: usize) -> f64 {
        index as f64 * self.delta_energy
    }

    /// Probability per rung; empty when nothing has been recorded.
    pub fn distribution(&self) -> Vec<f64> {
        let total = self.total();
        if total == 0 {
            return Vec::new();
        }
        self.counts
            .iter()
            .map(|&n| n as f64 / total as f64)
            .collect()
    }

    pub fn mean_energy(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let weighted: f64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(i, &n)| self.energy_of(i) * n as f64)
            .sum();
        Some(weighted / total as f64)
    }
}
