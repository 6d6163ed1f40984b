//! Integration tests for replica ensembles and artifacts.
//!
//! Tests:
//! 1. Determinism: same seed gives the same ensemble, parallel or not
//! 2. Conservation across every snapshot of every replica
//! 3. Replicas differ from each other under one master seed
//! 4. Equilibrium profile decays with energy for a downward bias
//! 5. Artifact bundle round-trip through a temp directory, all-or-nothing writes

use ladder_runner::{
    import_json, load_artifacts, run_ensemble, run_ensemble_with, save_artifacts, AgentGroup,
    SimulationConfig, SCHEMA_VERSION,
};

fn config(replicas: u32) -> SimulationConfig {
    SimulationConfig {
        steps: 400,
        delta_energy: 1.0,
        seed: Some(2020),
        replicas,
        burn_in: 100,
        record_every: 50,
        agents: vec![
            AgentGroup::new(40, 0.5, 0.4),
            AgentGroup {
                name: Some("verbose".into()),
                ..AgentGroup::new(1, 0.0, 0.5)
            },
        ],
    }
}

// ── 1. Determinism ───────────────────────────────────────────────────

#[test]
fn parallel_and_sequential_agree() {
    let par = run_ensemble_with(&config(4), true).unwrap();
    let seq = run_ensemble_with(&config(4), false).unwrap();
    assert_eq!(par.run_id, seq.run_id);
    assert_eq!(par.histogram, seq.histogram);
    for (a, b) in par.replicas.iter().zip(&seq.replicas) {
        assert_eq!(a.final_counts, b.final_counts);
        assert_eq!(a.snapshots, b.snapshots);
    }
}

#[test]
fn same_seed_same_result() {
    let a = run_ensemble(&config(2)).unwrap();
    let b = run_ensemble(&config(2)).unwrap();
    assert_eq!(a.histogram, b.histogram);
}

// ── 2. Conservation ──────────────────────────────────────────────────

#[test]
fn every_snapshot_conserves_agents() {
    let result = run_ensemble(&config(3)).unwrap();
    for replica in &result.replicas {
        assert_eq!(replica.agent_count, 41);
        for snap in &replica.snapshots {
            assert_eq!(snap.total, 41);
            assert_eq!(snap.counts.iter().sum::<usize>(), 41);
        }
    }
    assert_eq!(result.histogram.samples, 3 * 300);
    assert_eq!(result.histogram.total(), 3 * 300 * 41);
}

// ── 3. Replica independence ──────────────────────────────────────────

#[test]
fn replicas_take_different_paths() {
    let result = run_ensemble(&config(3)).unwrap();
    let first = &result.replicas[0].histogram;
    assert!(result.replicas[1..].iter().any(|r| &r.histogram != first));
}

// ── 4. Equilibrium profile ───────────────────────────────────────────

#[test]
fn downward_bias_gives_decaying_distribution() {
    let cfg = SimulationConfig {
        steps: 1_000,
        seed: Some(5),
        replicas: 4,
        burn_in: 200,
        record_every: 100,
        agents: vec![AgentGroup::new(100, 0.5, 0.3)],
        ..SimulationConfig::uniform(1, 0.5, 0.5, 1)
    };
    let result = run_ensemble(&cfg).unwrap();
    let p = result.distribution();
    assert!(p.len() >= 3);
    assert!(p[0] > p[1] && p[1] > p[2], "distribution {p:?}");

    // Birth-death chain with up 0.15 / down 0.35: ratio 3/7, mean 0.75.
    let mean = result.mean_energy().unwrap();
    assert!((mean - 0.75).abs() < 0.15, "mean energy {mean}");
}

// ── 5. Artifacts ─────────────────────────────────────────────────────

#[test]
fn artifacts_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_ensemble(&config(2)).unwrap();
    let run_dir = save_artifacts(&result, dir.path()).unwrap();

    for file in ["manifest.json", "config.toml", "histogram.csv", "snapshots.csv"] {
        assert!(run_dir.join(file).exists(), "missing {file}");
    }

    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.run_id, result.run_id);
    assert_eq!(loaded.histogram, result.histogram);
    assert_eq!(loaded.config, result.config);

    let config_text = std::fs::read_to_string(run_dir.join("config.toml")).unwrap();
    let reparsed = SimulationConfig::from_toml_str(&config_text).unwrap();
    assert_eq!(reparsed.run_id(), result.run_id);

    let snapshots = std::fs::read_to_string(run_dir.join("snapshots.csv")).unwrap();
    assert!(snapshots.starts_with("replica,step,rung,energy,count"));
}

#[test]
fn unwritable_config_leaves_no_partial_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut result = run_ensemble(&config(1)).unwrap();
    result.config.seed = Some(u64::MAX);

    assert!(save_artifacts(&result, dir.path()).is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn oversized_seed_is_rejected_before_running() {
    let cfg = SimulationConfig {
        seed: Some(u64::MAX),
        ..config(1)
    };
    assert!(run_ensemble(&cfg).is_err());
}

#[test]
fn future_schema_is_rejected() {
    let mut result = run_ensemble(&config(1)).unwrap();
    result.schema_version = SCHEMA_VERSION + 1;
    let json = serde_json::to_string(&result).unwrap();
    assert!(import_json(&json).is_err());
}
