//! Export — JSON and CSV artifact generation.
//!
//! - **JSON**: full round-trip serialization of an `EnsembleResult` with schema versioning
//! - **CSV**: occupation histogram and per-step snapshots for external analysis tools
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::histogram::OccupationHistogram;
use crate::runner::{EnsembleResult, SimulationResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `EnsembleResult` to pretty JSON.
pub fn export_json(result: &EnsembleResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize EnsembleResult to JSON")
}

/// Deserialize an `EnsembleResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<EnsembleResult> {
    let result: EnsembleResult =
        serde_json::from_str(json).context("failed to deserialize EnsembleResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a histogram as CSV.
///
/// Columns: rung, energy, count, probability
pub fn export_histogram_csv(histogram: &OccupationHistogram) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["rung", "energy", "count", "probability"])?;
    let distribution = histogram.distribution();
    for (i, &count) in histogram.counts.iter().enumerate() {
        let p = distribution.get(i).copied().unwrap_or(0.0);
        wtr.write_record([
            i.to_string(),
            histogram.energy_of(i).to_string(),
            count.to_string(),
            format!("{p:.6}"),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export snapshots of every replica as long-format CSV, one row per rung.
///
/// Columns: replica, step, rung, energy, count
pub fn export_snapshots_csv(replicas: &[SimulationResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["replica", "step", "rung", "energy", "count"])?;
    for result in replicas {
        for snap in &result.snapshots {
            for (i, count) in snap.counts.iter().enumerate() {
                wtr.write_record([
                    result.replica.to_string(),
                    snap.step.to_string(),
                    i.to_string(),
                    snap.energy_of(i).to_string(),
                    count.to_string(),
                ])?;
            }
        }
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for an ensemble run.
///
/// Creates a directory named `{run_id prefix}_{timestamp}/` under `output_dir`
/// containing:
/// - `manifest.json` — the full `EnsembleResult`
/// - `config.toml` — the config as run, seed resolved
/// - `histogram.csv` — merged occupation histogram
/// - `snapshots.csv` — per-replica occupancy snapshots
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &EnsembleResult, output_dir: &Path) -> Result<PathBuf> {
    // Render everything first so a failure leaves nothing on disk.
    let json = export_json(result)?;
    let toml = result.config.to_toml_string()?;
    let histogram_csv = export_histogram_csv(&result.histogram)?;
    let snapshots_csv = export_snapshots_csv(&result.replicas)?;

    let prefix: String = result.run_id.chars().take(12).collect();
    let dirname = format!("{}_{}", prefix, chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("manifest.json"), &json)?;
    std::fs::write(run_dir.join("config.toml"), &toml)?;
    std::fs::write(run_dir.join("histogram.csv"), &histogram_csv)?;
    std::fs::write(run_dir.join("snapshots.csv"), &snapshots_csv)?;

    Ok(run_dir)
}

/// Load an `EnsembleResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<EnsembleResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}
