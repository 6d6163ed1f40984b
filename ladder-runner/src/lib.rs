//! Ladder Runner — simulation orchestration on top of `ladder-core`.
//!
//! This crate provides:
//! - TOML simulation config with validation and content-addressed run ids
//! - Single-replica runner with snapshots and move totals
//! - Parallel replica ensembles with merged occupation histograms
//! - JSON and CSV artifact export

pub mod config;
pub mod export;
pub mod histogram;
pub mod runner;

pub use config::{AgentGroup, ConfigError, RunId, SimulationConfig, MAX_SEED};
pub use export::{
    export_histogram_csv, export_json, export_snapshots_csv, import_json, load_artifacts,
    save_artifacts,
};
pub use histogram::OccupationHistogram;
pub use runner::{
    run_ensemble, run_ensemble_with, run_simulation, EnsembleResult, MoveTotals, RunError,
    SimulationResult, SCHEMA_VERSION,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<SimulationConfig>();
        assert_sync::<SimulationConfig>();
        assert_send::<AgentGroup>();
        assert_sync::<AgentGroup>();
    }

    #[test]
    fn result_types_are_send_sync() {
        assert_send::<SimulationResult>();
        assert_sync::<SimulationResult>();
        assert_send::<EnsembleResult>();
        assert_sync::<EnsembleResult>();
        assert_send::<OccupationHistogram>();
        assert_sync::<OccupationHistogram>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
    }
}
