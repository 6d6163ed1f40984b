//! Serializable simulation configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! steps = 500
//! delta_energy = 1.0
//! seed = 42
//! replicas = 4
//! burn_in = 100
//! record_every = 10
//!
//! [[agents]]
//! count = 50
//! stay_probability = 0.5
//! up_probability = 0.4
//! name = "bulk"
//! ```

use std::path::{Path, PathBuf};

use ladder_core::{AgentParams, LadderError, DEFAULT_AGENT_ID, DEFAULT_DELTA_ENERGY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a simulation run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("invalid agent group: {0}")]
    Agent(#[from] LadderError),
}

/// Everything needed to reproduce a simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Number of steps each replica advances.
    pub steps: u64,

    /// Energy spacing between adjacent rungs.
    #[serde(default = "default_delta_energy")]
    pub delta_energy: f64,

    /// Master seed. `None` draws one from entropy at run time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Independent ladders run with the same agents and derived seeds.
    #[serde(default = "default_replicas")]
    pub replicas: u32,

    /// Steps excluded from the occupation histogram.
    #[serde(default)]
    pub burn_in: u64,

    /// Snapshot cadence in steps.
    #[serde(default = "default_record_every")]
    pub record_every: u64,

    pub agents: Vec<AgentGroup>,
}

/// `count` identical agents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentGroup {
    #[serde(default = "default_count")]
    pub count: usize,
    pub stay_probability: f64,
    pub up_probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Largest seed a config accepts. TOML integers are signed 64-bit.
pub const MAX_SEED: u64 = i64::MAX as u64;

fn default_delta_energy() -> f64 {
    DEFAULT_DELTA_ENERGY
}

fn default_replicas() -> u32 {
    1
}

fn default_record_every() -> u64 {
    1
}

fn default_count() -> usize {
    1
}

impl AgentGroup {
    pub fn new(count: usize, stay_probability: f64, up_probability: f64) -> Self {
        Self {
            count,
            stay_probability,
            up_probability,
            name: None,
        }
    }

    /// Validated agent parameters for every member of the group.
    pub fn params(&self) -> Result<AgentParams, LadderError> {
        let name = self.name.as_deref().unwrap_or(DEFAULT_AGENT_ID);
        AgentParams::new(self.stay_probability, self.up_probability, name)
    }
}

impl SimulationConfig {
    /// Single group of agents with default spacing, one replica, no seed.
    pub fn uniform(agents: usize, stay_probability: f64, up_probability: f64, steps: u64) -> Self {
        Self {
            steps,
            delta_energy: DEFAULT_DELTA_ENERGY,
            seed: None,
            replicas: 1,
            burn_in: 0,
            record_every: 1,
            agents: vec![AgentGroup::new(agents, stay_probability, up_probability)],
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps == 0 {
            return Err(ConfigError::Invalid("steps must be at least 1".into()));
        }
        if self.replicas == 0 {
            return Err(ConfigError::Invalid("replicas must be at least 1".into()));
        }
        if self.record_every == 0 {
            return Err(ConfigError::Invalid("record_every must be at least 1".into()));
        }
        if self.burn_in >= self.steps {
            return Err(ConfigError::Invalid(format!(
                "burn_in ({}) must be less than steps ({})",
                self.burn_in, self.steps
            )));
        }
        if !self.delta_energy.is_finite() || self.delta_energy <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "delta_energy must be positive and finite, got {}",
                self.delta_energy
            )));
        }
        if let Some(seed) = self.seed.filter(|&s| s > MAX_SEED) {
            return Err(ConfigError::Invalid(format!(
                "seed {seed} exceeds {MAX_SEED} and cannot be written back as TOML"
            )));
        }
        if self.agent_count() == 0 {
            return Err(ConfigError::Invalid("at least one agent is required".into()));
        }
        for group in &self.agents {
            group.params()?;
        }
        Ok(())
    }

    pub fn agent_count(&self) -> usize {
        self.agents.iter().map(|g| g.count).sum()
    }

    /// Copy with the seed fixed, drawing one from entropy if unset.
    ///
    /// Drawn seeds fit in 63 bits so the resolved config still writes as TOML.
    pub fn resolved(&self) -> Self {
        Self {
            seed: Some(self.seed.unwrap_or_else(|| rand::random::<u64>() & MAX_SEED)),
            ..self.clone()
        }
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs (seed included) have the same RunId.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("SimulationConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
steps = 500
delta_energy = 0.5
seed = 42
replicas = 4
burn_in = 100
record_every = 10

[[agents]]
count = 50
stay_probability = 0.5
up_probability = 0.4
name = "bulk"

[[agents]]
stay_probability = 0.0
up_probability = 0.5
name = "verbose"
"#;

    #[test]
    fn parses_full_config() {
        let config = SimulationConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.steps, 500);
        assert_eq!(config.delta_energy, 0.5);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.replicas, 4);
        assert_eq!(config.agents.len(), 2);
        assert_eq!(config.agents[1].count, 1);
        assert_eq!(config.agent_count(), 51);
        assert_eq!(config.agents[0].params().unwrap().id(), "bulk");
    }

    #[test]
    fn defaults_apply() {
        let config = SimulationConfig::from_toml_str(
            "steps = 10\n[[agents]]\nstay_probability = 0.5\nup_probability = 0.5\n",
        )
        .unwrap();
        assert_eq!(config.delta_energy, 1.0);
        assert_eq!(config.seed, None);
        assert_eq!(config.replicas, 1);
        assert_eq!(config.burn_in, 0);
        assert_eq!(config.record_every, 1);
        assert_eq!(config.agents[0].params().unwrap().id(), DEFAULT_AGENT_ID);
    }

    #[test]
    fn rejects_bad_probability() {
        let err = SimulationConfig::from_toml_str(
            "steps = 10\n[[agents]]\nstay_probability = 1.5\nup_probability = 0.5\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Agent(LadderError::InvalidArgument(_))));
    }

    #[test]
    fn rejects_degenerate_settings() {
        let base = SimulationConfig::uniform(5, 0.5, 0.5, 100);
        assert!(base.validate().is_ok());

        let cases = [
            SimulationConfig { steps: 0, ..base.clone() },
            SimulationConfig { replicas: 0, ..base.clone() },
            SimulationConfig { record_every: 0, ..base.clone() },
            SimulationConfig { burn_in: 100, ..base.clone() },
            SimulationConfig { delta_energy: 0.0, ..base.clone() },
            SimulationConfig { agents: vec![], ..base.clone() },
            SimulationConfig { agents: vec![AgentGroup::new(0, 0.5, 0.5)], ..base.clone() },
            SimulationConfig { seed: Some(MAX_SEED + 1), ..base.clone() },
            SimulationConfig { seed: Some(u64::MAX), ..base.clone() },
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))), "{config:?}");
        }
    }

    #[test]
    fn largest_seed_round_trips_through_toml() {
        let config = SimulationConfig {
            seed: Some(MAX_SEED),
            ..SimulationConfig::uniform(5, 0.5, 0.5, 100)
        };
        assert!(config.validate().is_ok());
        let text = config.to_toml_string().unwrap();
        let reparsed = SimulationConfig::from_toml_str(&text).unwrap();
        assert_eq!(reparsed.seed, Some(MAX_SEED));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            SimulationConfig::from_toml_str("steps = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn run_id_deterministic_and_sensitive() {
        let a = SimulationConfig::from_toml_str(SAMPLE).unwrap();
        let mut b = a.clone();
        assert_eq!(a.run_id(), b.run_id());
        b.seed = Some(43);
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn resolved_keeps_explicit_seed() {
        let config = SimulationConfig { seed: Some(9), ..SimulationConfig::uniform(1, 0.5, 0.5, 5) };
        assert_eq!(config.resolved().seed, Some(9));
        assert!(SimulationConfig::uniform(1, 0.5, 0.5, 5).resolved().seed.is_some());
    }

    #[test]
    fn toml_round_trip() {
        let config = SimulationConfig::from_toml_str(SAMPLE).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(SimulationConfig::from_toml_str(&text).unwrap(), config);
    }
}
