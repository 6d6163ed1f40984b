//! Reproducible random streams for agents.
//!
//! Keys are derived in two levels with keyed BLAKE3: the master seed and run
//! id give a run key, the run key and a replica index give a replica key, and
//! the replica key and an agent index give that agent's 32-byte `StdRng`
//! seed. An agent's stream depends only on where it sits in that tree, never
//! on which replica or agent was built first.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Root of the key tree for one run.
#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
    run_key: [u8; 32],
}

impl RngHierarchy {
    pub fn new(master_seed: u64, run_id: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&master_seed.to_le_bytes());
        hasher.update(run_id.as_bytes());
        Self {
            master_seed,
            run_key: *hasher.finalize().as_bytes(),
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Key material for every agent of one replica.
    pub fn replica(&self, replica: u32) -> ReplicaStreams {
        let key = blake3::keyed_hash(&self.run_key, &u64::from(replica).to_le_bytes());
        ReplicaStreams {
            replica,
            key: *key.as_bytes(),
        }
    }
}

/// Per-agent streams of a single replica.
#[derive(Debug, Clone)]
pub struct ReplicaStreams {
    replica: u32,
    key: [u8; 32],
}

impl ReplicaStreams {
    pub fn replica(&self) -> u32 {
        self.replica
    }

    /// A fresh generator for the agent at `agent` in seeding order.
    pub fn agent_rng(&self, agent: u64) -> StdRng {
        StdRng::from_seed(*blake3::keyed_hash(&self.key, &agent.to_le_bytes()).as_bytes())
    }
}
